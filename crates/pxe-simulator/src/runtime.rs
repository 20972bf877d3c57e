use alloc::{collections::BTreeMap, vec::Vec};

use pxe_objects::{Felt, abi::FunctionArtifact, transaction::PrivateCircuitPublicInputs};

use crate::{OracleError, RuntimeError};

// FOREIGN CALL HANDLER
// ================================================================================================

/// Resolves the foreign (oracle) calls a function makes while it executes.
///
/// Every input and output is a flat sequence of field elements. `inputs` holds one entry per
/// oracle parameter; scalars are single-element entries.
pub trait ForeignCallHandler {
    fn handle(&mut self, name: &str, inputs: &[Vec<Felt>]) -> Result<Vec<Felt>, OracleError>;
}

// FUNCTION RUNTIME
// ================================================================================================

/// Output of executing a private function.
#[derive(Debug, Clone, Default)]
pub struct PrivateExecutionOutput {
    pub public_inputs: PrivateCircuitPublicInputs,
    /// Witness values solved during execution, keyed by witness index.
    pub partial_witness: BTreeMap<u32, Felt>,
}

/// The constrained-execution backend which runs compiled functions.
///
/// A runtime is created once and shared by every simulation. Any process-wide state it needs,
/// such as a black-box function solver, is owned by the runtime itself.
pub trait FunctionRuntime: Send + Sync {
    /// Executes a private function, resolving its oracle calls through `handler`.
    fn execute_private(
        &self,
        artifact: &FunctionArtifact,
        initial_witness: Vec<Felt>,
        handler: &mut dyn ForeignCallHandler,
    ) -> Result<PrivateExecutionOutput, RuntimeError>;

    /// Executes an unconstrained function and returns its return values.
    fn execute_unconstrained(
        &self,
        artifact: &FunctionArtifact,
        args: Vec<Felt>,
        handler: &mut dyn ForeignCallHandler,
    ) -> Result<Vec<Felt>, RuntimeError>;
}
