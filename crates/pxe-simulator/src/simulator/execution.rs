use pxe_objects::{
    StarkField,
    abi::FunctionArtifact,
    transaction::{FunctionData, PrivateCallStackItem},
    witness::NoteHashReadRequestMembershipWitness,
};
use tracing::trace;

use crate::{
    ExecutionContext, ExecutionError, ExecutionResult, OracleAdapter, PrivateExecutionOutput,
    SimulationError,
};

/// Executes a private function in `context` and returns the result of the whole call tree below
/// it.
///
/// Nested calls made by the function are executed synchronously while it runs. A failure
/// anywhere aborts the execution and is reported with the call context of the call in which it
/// originated.
pub(crate) fn execute_private_function(
    mut context: ExecutionContext<'_, '_>,
    artifact: &FunctionArtifact,
) -> Result<ExecutionResult, SimulationError> {
    let call_context = *context.call_context();
    run(&mut context, artifact)
        .and_then(|output| build_result(context, artifact, output))
        .map_err(|err| SimulationError::new(Some(call_context), err))
}

fn run(
    context: &mut ExecutionContext<'_, '_>,
    artifact: &FunctionArtifact,
) -> Result<PrivateExecutionOutput, ExecutionError> {
    let initial_witness = context.initial_witness(artifact)?;
    trace!(
        target: "pxe::simulator",
        function = artifact.name(),
        contract = %context.contract_address(),
        witness_len = initial_witness.len(),
        "executing private function"
    );

    let runtime = context.env().runtime;
    let mut adapter = OracleAdapter::new(context);
    Ok(runtime.execute_private(artifact, initial_witness, &mut adapter)?)
}

fn build_result(
    mut context: ExecutionContext<'_, '_>,
    artifact: &FunctionArtifact,
    output: PrivateExecutionOutput,
) -> Result<ExecutionResult, ExecutionError> {
    let mut public_inputs = output.public_inputs;
    public_inputs.encrypted_log_preimages_length = context.encrypted_logs.serialized_length();
    public_inputs.unencrypted_log_preimages_length = context.unencrypted_logs.serialized_length();

    let tx = context.tx_mut();
    tx.counter.close_call(public_inputs.end_side_effect_counter)?;
    let return_values = tx.packed_values.unpack(public_inputs.returns_hash)?;

    let note_hash_read_request_partial_witnesses = public_inputs
        .note_hash_read_requests
        .iter()
        .map(|request| match context.settled_reads.get(&request.value.as_int()) {
            Some(index) => NoteHashReadRequestMembershipWitness::settled(*index),
            None => NoteHashReadRequestMembershipWitness::transient(),
        })
        .collect();

    let call_stack_item = PrivateCallStackItem {
        contract_address: context.contract_address(),
        function_data: FunctionData::new(artifact.selector(), true),
        public_inputs,
    };

    Ok(ExecutionResult {
        bytecode: artifact.bytecode().to_vec(),
        verification_key: artifact.verification_key().to_vec(),
        partial_witness: output.partial_witness,
        call_stack_item,
        note_hash_read_request_partial_witnesses,
        new_notes: context.new_notes,
        nullified_note_hash_counters: context.nullified_note_hash_counters,
        return_values,
        nested_executions: context.nested_executions,
        enqueued_public_function_calls: context.enqueued_public_calls,
        encrypted_logs: context.encrypted_logs,
        unencrypted_logs: context.unencrypted_logs,
    })
}
