use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};

use pxe_objects::{
    Felt, FieldDecodingError, PRIVATE_CALL_STACK_ITEM_LENGTH,
    abi::FunctionArtifact,
    address::{Address, EventSelector, FunctionSelector, Point},
    block::BlockHeader,
    fields::{FieldReader, bool_to_felt, felt_to_bool, felt_to_u32},
    hash::{
        compute_unique_note_hash, compute_var_args_hash, hash_with_separator, separator,
        silo_note_hash,
    },
    note::{NoteFilter, NoteStatus},
    transaction::{
        CallContext, PrivateCircuitPublicInputs, ReadRequest, SideEffect,
        SideEffectLinkedToNoteHash, TxContext,
    },
};

use super::mock_inner_note_hash;
use crate::{ForeignCallHandler, FunctionRuntime, PrivateExecutionOutput, RuntimeError};

/// Body of a scripted private function. Returns the function's return values.
pub type PrivateFunction =
    Box<dyn Fn(&mut PrivateContextStub<'_>) -> Result<Vec<Felt>, RuntimeError> + Send + Sync>;

/// Body of a scripted unconstrained function.
pub type UnconstrainedFunction = Box<
    dyn Fn(&[Felt], &mut dyn ForeignCallHandler) -> Result<Vec<Felt>, RuntimeError> + Send + Sync,
>;

// MOCK RUNTIME
// ================================================================================================

/// A [FunctionRuntime] which runs Rust closures in place of compiled functions.
///
/// Functions are looked up by the bytecode of their artifact.
#[derive(Default)]
pub struct MockRuntime {
    private_functions: BTreeMap<Vec<u8>, PrivateFunction>,
    unconstrained_functions: BTreeMap<Vec<u8>, UnconstrainedFunction>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_private_function(
        &mut self,
        bytecode: impl Into<Vec<u8>>,
        function: impl Fn(&mut PrivateContextStub<'_>) -> Result<Vec<Felt>, RuntimeError>
        + Send
        + Sync
        + 'static,
    ) {
        self.private_functions.insert(bytecode.into(), Box::new(function));
    }

    pub fn add_unconstrained_function(
        &mut self,
        bytecode: impl Into<Vec<u8>>,
        function: impl Fn(&[Felt], &mut dyn ForeignCallHandler) -> Result<Vec<Felt>, RuntimeError>
        + Send
        + Sync
        + 'static,
    ) {
        self.unconstrained_functions.insert(bytecode.into(), Box::new(function));
    }
}

impl FunctionRuntime for MockRuntime {
    fn execute_private(
        &self,
        artifact: &FunctionArtifact,
        initial_witness: Vec<Felt>,
        handler: &mut dyn ForeignCallHandler,
    ) -> Result<PrivateExecutionOutput, RuntimeError> {
        let function = self
            .private_functions
            .get(artifact.bytecode())
            .ok_or_else(|| missing_bytecode(artifact))?;

        let mut context = PrivateContextStub::new(&initial_witness, handler)?;
        let return_values = function(&mut context)?;
        context.finish(&return_values)
    }

    fn execute_unconstrained(
        &self,
        artifact: &FunctionArtifact,
        args: Vec<Felt>,
        handler: &mut dyn ForeignCallHandler,
    ) -> Result<Vec<Felt>, RuntimeError> {
        let function = self
            .unconstrained_functions
            .get(artifact.bytecode())
            .ok_or_else(|| missing_bytecode(artifact))?;
        function(&args, handler)
    }
}

fn missing_bytecode(artifact: &FunctionArtifact) -> RuntimeError {
    RuntimeError::ExecutionFailed(format!("no code registered for `{}`", artifact.name()))
}

// PRIVATE CONTEXT STUB
// ================================================================================================

/// A note as returned to a function by `getNotes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedNote {
    pub contract_address: Address,
    pub nonce: Felt,
    pub is_pending: bool,
    pub items: Vec<Felt>,
}

/// The function-side half of the oracle protocol.
///
/// Plays the part of the private context a compiled function links against: it decodes the
/// initial witness, issues side-effect counters, talks to the host through oracle calls and
/// accumulates the function's public inputs.
pub struct PrivateContextStub<'h> {
    handler: &'h mut dyn ForeignCallHandler,
    call_context: CallContext,
    historical_header: BlockHeader,
    tx_context: TxContext,
    args: Vec<Felt>,
    counter: u32,
    public_inputs: PrivateCircuitPublicInputs,
}

impl<'h> PrivateContextStub<'h> {
    fn new(
        initial_witness: &[Felt],
        handler: &'h mut dyn ForeignCallHandler,
    ) -> Result<Self, RuntimeError> {
        let mut reader = FieldReader::new(initial_witness);
        let call_context = CallContext::read_from(&mut reader).map_err(malformed_witness)?;
        let historical_header = BlockHeader::read_from(&mut reader).map_err(malformed_witness)?;
        let tx_context = TxContext::read_from(&mut reader).map_err(malformed_witness)?;
        let args = reader.read_to_end();

        Ok(Self {
            handler,
            call_context,
            historical_header,
            tx_context,
            counter: call_context.side_effect_counter,
            args,
            public_inputs: PrivateCircuitPublicInputs::default(),
        })
    }

    // ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub fn call_context(&self) -> &CallContext {
        &self.call_context
    }

    /// Returns the address of the contract whose state the function accesses.
    pub fn contract_address(&self) -> Address {
        self.call_context.storage_contract_address
    }

    pub fn args(&self) -> &[Felt] {
        &self.args
    }

    pub fn historical_header(&self) -> &BlockHeader {
        &self.historical_header
    }

    /// Returns the counter of the last side effect issued by this function.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Sets the side-effect counter; lets tests issue counters out of order.
    pub fn set_counter(&mut self, counter: u32) {
        self.counter = counter;
    }

    pub fn public_inputs(&self) -> &PrivateCircuitPublicInputs {
        &self.public_inputs
    }

    // ORACLE CALLS
    // --------------------------------------------------------------------------------------------

    /// Makes a raw oracle call.
    pub fn oracle(&mut self, name: &str, inputs: &[Vec<Felt>]) -> Result<Vec<Felt>, RuntimeError> {
        self.handler
            .handle(name, inputs)
            .map_err(|err| RuntimeError::foreign_call(name, err))
    }

    pub fn random_field(&mut self) -> Result<Felt, RuntimeError> {
        self.oracle_field("getRandomField", &[])
    }

    pub fn pack_arguments(&mut self, args: &[Felt]) -> Result<Felt, RuntimeError> {
        self.oracle_field("packArgumentsArray", &[args.to_vec()])
    }

    /// Creates a note and returns its inner note hash.
    pub fn create_note(
        &mut self,
        storage_slot: Felt,
        note_type_id: Felt,
        items: Vec<Felt>,
    ) -> Result<Felt, RuntimeError> {
        let inner_note_hash = mock_inner_note_hash(&items);
        let counter = self.next_counter();
        self.oracle(
            "notifyCreatedNote",
            &[
                vec![storage_slot],
                vec![note_type_id],
                items,
                vec![inner_note_hash],
                vec![Felt::new(counter as u64)],
            ],
        )?;
        self.public_inputs.new_note_hashes.push(SideEffect::new(inner_note_hash, counter));
        Ok(inner_note_hash)
    }

    /// Reads up to `max_notes` active notes of `note_len` items and records a read request for
    /// each of them.
    pub fn get_notes(
        &mut self,
        storage_slot: Felt,
        filter: &NoteFilter,
        note_len: usize,
        max_notes: usize,
    ) -> Result<Vec<RetrievedNote>, RuntimeError> {
        let return_size = 2 + max_notes * (2 + note_len);
        let mut inputs = vec![vec![storage_slot], vec![Felt::new(filter.selects.len() as u64)]];
        inputs.push(filter.selects.iter().map(|s| Felt::new(s.selector.index as u64)).collect());
        inputs.push(filter.selects.iter().map(|s| Felt::new(s.selector.offset as u64)).collect());
        inputs.push(filter.selects.iter().map(|s| Felt::new(s.selector.length as u64)).collect());
        inputs.push(filter.selects.iter().map(|s| s.value).collect());
        inputs.push(filter.selects.iter().map(|s| Felt::new(s.comparator as u64)).collect());
        inputs.push(filter.sorts.iter().map(|s| Felt::new(s.selector.index as u64)).collect());
        inputs.push(filter.sorts.iter().map(|s| Felt::new(s.selector.offset as u64)).collect());
        inputs.push(filter.sorts.iter().map(|s| Felt::new(s.selector.length as u64)).collect());
        inputs.push(filter.sorts.iter().map(|s| Felt::new(s.order as u64)).collect());
        inputs.push(vec![Felt::new(filter.limit as u64)]);
        inputs.push(vec![Felt::new(filter.offset as u64)]);
        inputs.push(vec![Felt::new(NoteStatus::Active as u64)]);
        inputs.push(vec![Felt::new(return_size as u64)]);

        let fields = self.oracle("getNotes", &inputs)?;
        let mut reader = FieldReader::new(&fields);
        let count = reader.read_u32().map_err(malformed_response)? as usize;
        let contract_address = Address::from(reader.read_field().map_err(malformed_response)?);

        let mut notes = Vec::with_capacity(count);
        for _ in 0..count {
            let nonce = reader.read_field().map_err(malformed_response)?;
            let is_pending = reader.read_bool().map_err(malformed_response)?;
            let items = reader.read_fields(note_len).map_err(malformed_response)?;

            let inner_note_hash = mock_inner_note_hash(&items);
            let request_value = if is_pending {
                inner_note_hash
            } else {
                compute_unique_note_hash(nonce, silo_note_hash(contract_address, inner_note_hash))
            };
            let counter = self.next_counter();
            self.public_inputs
                .note_hash_read_requests
                .push(ReadRequest::new(request_value, counter));
            notes.push(RetrievedNote { contract_address, nonce, is_pending, items });
        }
        Ok(notes)
    }

    /// Nullifies a note. A zero `inner_note_hash` refers to a settled note.
    pub fn nullify_note(
        &mut self,
        inner_nullifier: Felt,
        inner_note_hash: Felt,
    ) -> Result<(), RuntimeError> {
        let counter = self.next_counter();
        self.oracle(
            "notifyNullifiedNote",
            &[vec![inner_nullifier], vec![inner_note_hash], vec![Felt::new(counter as u64)]],
        )?;
        self.public_inputs.new_nullifiers.push(SideEffectLinkedToNoteHash {
            value: inner_nullifier,
            note_hash: inner_note_hash,
            counter,
        });
        Ok(())
    }

    pub fn check_nullifier_exists(&mut self, inner_nullifier: Felt) -> Result<bool, RuntimeError> {
        let exists = self.oracle_field("checkNullifierExists", &[vec![inner_nullifier]])?;
        felt_to_bool(exists).map_err(malformed_response)
    }

    pub fn storage_read(&mut self, start_slot: Felt, num_values: usize) -> Result<Vec<Felt>, RuntimeError> {
        self.oracle("storageRead", &[vec![start_slot], vec![Felt::new(num_values as u64)]])
    }

    pub fn get_auth_witness(&mut self, message_hash: Felt) -> Result<Vec<Felt>, RuntimeError> {
        self.oracle("getAuthWitness", &[vec![message_hash]])
    }

    pub fn pop_capsule(&mut self) -> Result<Vec<Felt>, RuntimeError> {
        self.oracle("popCapsule", &[])
    }

    /// Emits a debug message; `{i}` placeholders are replaced with `args[i]`.
    pub fn debug_log(&mut self, message: &str, args: &[Felt]) -> Result<(), RuntimeError> {
        let mut inputs = vec![string_to_fields(message)];
        inputs.extend(args.iter().map(|arg| vec![*arg]));
        self.oracle("debugLog", &inputs)?;
        Ok(())
    }

    /// Emits an encrypted log and returns its hash.
    pub fn emit_encrypted_log(
        &mut self,
        storage_slot: Felt,
        note_type_id: Felt,
        recipient: Point,
        payload: Vec<Felt>,
    ) -> Result<Felt, RuntimeError> {
        let inputs = [
            vec![self.contract_address().as_felt()],
            vec![storage_slot],
            vec![note_type_id],
            vec![recipient.x],
            vec![recipient.y],
            payload,
        ];
        let hash = self.oracle_field("emitEncryptedLog", &inputs)?;
        let counter = self.next_counter();
        self.public_inputs.encrypted_logs_hashes.push(SideEffect::new(hash, counter));
        Ok(hash)
    }

    /// Emits an unencrypted log and returns its hash.
    pub fn emit_unencrypted_log(
        &mut self,
        selector: EventSelector,
        data: Vec<Felt>,
    ) -> Result<Felt, RuntimeError> {
        let inputs = [vec![self.contract_address().as_felt()], vec![selector.to_field()], data];
        let hash = self.oracle_field("emitUnencryptedLog", &inputs)?;
        let counter = self.next_counter();
        self.public_inputs.unencrypted_logs_hashes.push(SideEffect::new(hash, counter));
        Ok(hash)
    }

    // CALLS
    // --------------------------------------------------------------------------------------------

    /// Calls a private function and returns its return values.
    pub fn call_private(
        &mut self,
        target: Address,
        selector: FunctionSelector,
        args: &[Felt],
    ) -> Result<Vec<Felt>, RuntimeError> {
        self.call_private_with(target, selector, args, false, false)
    }

    pub fn call_private_with(
        &mut self,
        target: Address,
        selector: FunctionSelector,
        args: &[Felt],
        is_static_call: bool,
        is_delegate_call: bool,
    ) -> Result<Vec<Felt>, RuntimeError> {
        let inputs = self.invocation(target, selector, args, is_static_call, is_delegate_call)?;
        let item = self.oracle("callPrivateFunction", &inputs)?;
        if item.len() != PRIVATE_CALL_STACK_ITEM_LENGTH {
            return Err(malformed_response(FieldDecodingError::UnexpectedLength {
                expected: PRIVATE_CALL_STACK_ITEM_LENGTH,
                actual: item.len(),
            }));
        }

        // the call continues from the end counter of the callee
        self.counter = felt_to_u32(item[12]).map_err(malformed_response)?;
        self.public_inputs
            .private_call_stack_hashes
            .push(hash_with_separator(separator::CALL_STACK_ITEM, &item));
        self.oracle("unpackReturns", &[vec![item[10]]])
    }

    /// Enqueues a call to a public function.
    pub fn enqueue_public(
        &mut self,
        target: Address,
        selector: FunctionSelector,
        args: &[Felt],
    ) -> Result<(), RuntimeError> {
        let inputs = self.invocation(target, selector, args, false, false)?;
        let mut request = self.oracle("enqueuePublicFunctionCall", &inputs)?;
        request.extend(self.call_context.to_fields());
        self.public_inputs
            .public_call_stack_hashes
            .push(hash_with_separator(separator::CALL_STACK_ITEM, &request));
        Ok(())
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    fn next_counter(&mut self) -> u32 {
        self.counter += 1;
        self.counter
    }

    fn oracle_field(&mut self, name: &str, inputs: &[Vec<Felt>]) -> Result<Felt, RuntimeError> {
        let fields = self.oracle(name, inputs)?;
        fields.first().copied().ok_or_else(|| {
            malformed_response(FieldDecodingError::UnexpectedEnd { expected: 1, available: 0 })
        })
    }

    fn invocation(
        &mut self,
        target: Address,
        selector: FunctionSelector,
        args: &[Felt],
        is_static_call: bool,
        is_delegate_call: bool,
    ) -> Result<Vec<Vec<Felt>>, RuntimeError> {
        let args_hash = self.pack_arguments(args)?;
        let counter = self.next_counter();
        Ok(vec![
            vec![target.as_felt()],
            vec![selector.to_field()],
            vec![args_hash],
            vec![Felt::new(counter as u64)],
            vec![bool_to_felt(is_static_call)],
            vec![bool_to_felt(is_delegate_call)],
        ])
    }

    /// Packs the return values and completes the public inputs of the function.
    fn finish(mut self, return_values: &[Felt]) -> Result<PrivateExecutionOutput, RuntimeError> {
        let returns_hash = self.oracle_field(
            "packReturns",
            &[vec![Felt::new(return_values.len() as u64)], return_values.to_vec()],
        )?;

        let mut public_inputs = self.public_inputs;
        public_inputs.call_context = self.call_context;
        public_inputs.args_hash = compute_var_args_hash(&self.args);
        public_inputs.returns_hash = returns_hash;
        public_inputs.start_side_effect_counter = self.call_context.side_effect_counter;
        public_inputs.end_side_effect_counter = self.counter;
        public_inputs.historical_header = self.historical_header;
        public_inputs.tx_context = self.tx_context;

        let partial_witness = return_values
            .iter()
            .enumerate()
            .map(|(i, value)| (i as u32, *value))
            .collect();
        Ok(PrivateExecutionOutput { public_inputs, partial_witness })
    }
}

// HELPER FUNCTIONS
// ================================================================================================

/// Encodes a string as one byte per field element.
pub fn string_to_fields(value: &str) -> Vec<Felt> {
    value.bytes().map(|byte| Felt::new(byte as u64)).collect()
}

fn malformed_witness(err: FieldDecodingError) -> RuntimeError {
    RuntimeError::other_with_source("malformed initial witness", err)
}

fn malformed_response(err: FieldDecodingError) -> RuntimeError {
    RuntimeError::other_with_source("malformed oracle response", err)
}
