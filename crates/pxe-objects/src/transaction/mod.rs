mod call_context;
mod call_stack;
mod packed_values;
mod public_inputs;
mod request;

pub use call_context::{CallContext, FunctionData, TxContext};
pub use call_stack::{CallInvocation, PrivateCallStackItem, PublicCallRequest};
pub use packed_values::PackedValues;
pub use public_inputs::{
    L2ToL1Message, PrivateCircuitPublicInputs, ReadRequest, SideEffect,
    SideEffectLinkedToNoteHash,
};
pub use request::{AuthWitness, FunctionCall, TxExecutionRequest};
