use alloc::{collections::BTreeMap, vec::Vec};

use pxe_objects::{
    Felt,
    logs::{EncryptedFunctionL2Logs, FunctionL2Logs, UnencryptedFunctionL2Logs},
    note::{NoteAndSlot, NullifiedNoteHashCounter},
    transaction::{PrivateCallStackItem, PublicCallRequest},
    witness::NoteHashReadRequestMembershipWitness,
};

// EXECUTION RESULT
// ================================================================================================

/// Result of executing a private function together with every private call it made.
///
/// Results form a tree: `nested_executions` holds the results of the function's nested private
/// calls in call order.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub bytecode: Vec<u8>,
    pub verification_key: Vec<u8>,
    pub partial_witness: BTreeMap<u32, Felt>,
    pub call_stack_item: PrivateCallStackItem,
    /// One witness per note hash read request of the function, in request order.
    pub note_hash_read_request_partial_witnesses: Vec<NoteHashReadRequestMembershipWitness>,
    pub new_notes: Vec<NoteAndSlot>,
    /// Pending notes nullified by this function.
    pub nullified_note_hash_counters: Vec<NullifiedNoteHashCounter>,
    pub return_values: Vec<Felt>,
    pub nested_executions: Vec<ExecutionResult>,
    pub enqueued_public_function_calls: Vec<PublicCallRequest>,
    pub encrypted_logs: EncryptedFunctionL2Logs,
    pub unencrypted_logs: UnencryptedFunctionL2Logs,
}

impl ExecutionResult {
    /// Returns an iterator over this result and all nested results, parents before children.
    pub fn iter_preorder(&self) -> impl Iterator<Item = &ExecutionResult> {
        let mut stack = vec![self];
        core::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.nested_executions.iter().rev());
            Some(next)
        })
    }
}

// AGGREGATION
// ================================================================================================

/// Collects the nullified note hash counters of the whole tree, parents before children.
pub fn collect_nullified_note_hash_counters(
    result: &ExecutionResult,
) -> Vec<NullifiedNoteHashCounter> {
    result
        .iter_preorder()
        .flat_map(|result| result.nullified_note_hash_counters.iter().copied())
        .collect()
}

/// Collects the encrypted logs of the whole tree.
///
/// Each function's logs come first, followed by those of its nested calls in reverse call order.
pub fn collect_encrypted_logs(result: &ExecutionResult) -> Vec<EncryptedFunctionL2Logs> {
    let mut logs = Vec::new();
    collect_logs(result, |result| &result.encrypted_logs, &mut logs);
    logs
}

/// Collects the unencrypted logs of the whole tree, in the same order as
/// [collect_encrypted_logs].
pub fn collect_unencrypted_logs(result: &ExecutionResult) -> Vec<UnencryptedFunctionL2Logs> {
    let mut logs = Vec::new();
    collect_logs(result, |result| &result.unencrypted_logs, &mut logs);
    logs
}

/// Collects the public calls enqueued across the whole tree, ordered by descending side-effect
/// counter.
pub fn collect_enqueued_public_function_calls(result: &ExecutionResult) -> Vec<PublicCallRequest> {
    let mut calls: Vec<PublicCallRequest> = result
        .iter_preorder()
        .flat_map(|result| result.enqueued_public_function_calls.iter().cloned())
        .collect();
    calls.sort_by(|a, b| b.side_effect_counter().cmp(&a.side_effect_counter()));
    calls
}

fn collect_logs<L: Clone>(
    result: &ExecutionResult,
    select: fn(&ExecutionResult) -> &FunctionL2Logs<L>,
    logs: &mut Vec<FunctionL2Logs<L>>,
) {
    logs.push(select(result).clone());
    for nested in result.nested_executions.iter().rev() {
        collect_logs(nested, select, logs);
    }
}

// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use pxe_objects::{
        address::{Address, EventSelector},
        logs::UnencryptedL2Log,
        transaction::{CallContext, FunctionData, PrivateCircuitPublicInputs},
    };

    use super::*;

    fn result(tag: u64) -> ExecutionResult {
        ExecutionResult {
            bytecode: Vec::new(),
            verification_key: Vec::new(),
            partial_witness: BTreeMap::new(),
            call_stack_item: PrivateCallStackItem {
                contract_address: Address::new(Felt::new(tag)),
                function_data: FunctionData::empty(),
                public_inputs: PrivateCircuitPublicInputs::default(),
            },
            note_hash_read_request_partial_witnesses: Vec::new(),
            new_notes: Vec::new(),
            nullified_note_hash_counters: Vec::new(),
            return_values: Vec::new(),
            nested_executions: Vec::new(),
            enqueued_public_function_calls: Vec::new(),
            encrypted_logs: EncryptedFunctionL2Logs::default(),
            unencrypted_logs: UnencryptedFunctionL2Logs::default(),
        }
    }

    fn with_log(tag: u64) -> ExecutionResult {
        let mut result = result(tag);
        result.unencrypted_logs.push(UnencryptedL2Log {
            contract_address: Address::new(Felt::new(tag)),
            selector: EventSelector::new(0),
            data: vec![Felt::new(tag)],
        });
        result
    }

    fn enqueued(counter: u32) -> PublicCallRequest {
        PublicCallRequest {
            contract_address: Address::ZERO,
            function_data: FunctionData::empty(),
            call_context: CallContext { side_effect_counter: counter, ..Default::default() },
            parent_call_context: CallContext::default(),
            args: Vec::new(),
        }
    }

    #[test]
    fn logs_of_nested_calls_are_collected_in_reverse_call_order() {
        let mut root = with_log(1);
        root.nested_executions = vec![with_log(2), with_log(3)];

        let tags: Vec<Felt> = collect_unencrypted_logs(&root)
            .iter()
            .map(|logs| logs.logs()[0].data[0])
            .collect();
        assert_eq!(tags, [Felt::new(1), Felt::new(3), Felt::new(2)]);
        assert_eq!(collect_encrypted_logs(&root).len(), 3);
    }

    #[test]
    fn enqueued_calls_are_sorted_by_descending_counter() {
        let mut root = result(1);
        root.enqueued_public_function_calls.push(enqueued(5));
        let mut child = result(2);
        child.enqueued_public_function_calls.push(enqueued(2));
        let mut grandchild = result(3);
        grandchild.enqueued_public_function_calls.push(enqueued(8));
        child.nested_executions.push(grandchild);
        root.nested_executions.push(child);

        let counters: Vec<u32> = collect_enqueued_public_function_calls(&root)
            .iter()
            .map(PublicCallRequest::side_effect_counter)
            .collect();
        assert_eq!(counters, [8, 5, 2]);
    }

    #[test]
    fn nullified_note_hash_counters_are_collected_in_preorder() {
        let pair = |note_hash_counter| NullifiedNoteHashCounter {
            note_hash_counter,
            nullifier_counter: note_hash_counter + 1,
        };
        let mut root = result(1);
        root.nullified_note_hash_counters.push(pair(2));
        let mut first = result(2);
        first.nullified_note_hash_counters.push(pair(4));
        let mut second = result(3);
        second.nullified_note_hash_counters.push(pair(8));
        root.nested_executions = vec![first, second];

        let counters: Vec<u32> = collect_nullified_note_hash_counters(&root)
            .iter()
            .map(|pair| pair.note_hash_counter)
            .collect();
        assert_eq!(counters, [2, 4, 8]);
        assert_eq!(root.iter_preorder().count(), 3);
    }
}
