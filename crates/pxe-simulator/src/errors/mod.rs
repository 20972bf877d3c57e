use alloc::{boxed::Box, string::String};
use core::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use pxe_objects::{
    AbiError, Felt, FieldDecodingError, NoteError,
    abi::FunctionType,
    address::{Address, FunctionSelector},
    block::MerkleTreeId,
    transaction::CallContext,
};
use thiserror::Error;

// ERROR KIND
// ================================================================================================

/// Classification of every failure the simulator can report.
///
/// None of these are retried by the simulator; callers decide whether a retry makes sense based
/// on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested oracle is not supported in the current execution mode.
    CapabilityUnavailable,
    /// A witness, header, auth witness, capsule or other record does not exist.
    NotFound,
    /// A value crossing the oracle boundary was malformed or did not fit its declared size.
    EncodingViolation,
    /// A contract broke a rule of the calling convention.
    ContractInterfaceViolation,
    /// A function was invoked under the wrong execution mode.
    WrongFunctionKind,
    /// The data store failed.
    DataSource,
    /// The function runtime failed for a reason unrelated to an oracle.
    Runtime,
}

// DATA STORE ERROR
// ================================================================================================

#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("block with number {0} not found in data store")]
    BlockNotFound(u32),
    /// Custom error variant for implementors of the [`DataStore`](crate::DataStore) trait.
    #[error("{error_msg}")]
    Other {
        error_msg: Box<str>,
        // thiserror will return this when calling Error::source on DataStoreError.
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
}

impl DataStoreError {
    /// Creates a custom error using the [`DataStoreError::Other`] variant from an error message.
    pub fn other(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Other { error_msg: message.into(), source: None }
    }

    /// Creates a custom error using the [`DataStoreError::Other`] variant from an error message and
    /// a source error.
    pub fn other_with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        let message: String = message.into();
        Self::Other {
            error_msg: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// ORACLE ERROR
// ================================================================================================

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle `{0}` is not available in this execution mode")]
    CapabilityUnavailable(&'static str),

    // NOT FOUND
    // --------------------------------------------------------------------------------------------
    #[error("no membership witness for leaf {leaf} in the {tree_id} at block {block_number}")]
    MembershipWitnessNotFound {
        tree_id: MerkleTreeId,
        leaf: Felt,
        block_number: u32,
    },
    #[error("no sibling path for leaf index {index} in the {tree_id} at block {block_number}")]
    SiblingPathNotFound {
        tree_id: MerkleTreeId,
        index: u64,
        block_number: u32,
    },
    #[error("no membership witness for nullifier {nullifier} at block {block_number}")]
    NullifierWitnessNotFound { nullifier: Felt, block_number: u32 },
    #[error("no low nullifier witness for nullifier {nullifier} at block {block_number}")]
    LowNullifierWitnessNotFound { nullifier: Felt, block_number: u32 },
    #[error("no public data witness for leaf slot {leaf_slot} at block {block_number}")]
    PublicDataWitnessNotFound { leaf_slot: Felt, block_number: u32 },
    #[error("block header {0} not found")]
    BlockHeaderNotFound(u32),
    #[error("no auth witness for message hash {0}")]
    AuthWitnessNotFound(Felt),
    #[error("no capsules available")]
    NoCapsulesAvailable,
    #[error("L1 to L2 message {0} not found")]
    L1ToL2MessageNotFound(Felt),
    #[error("no packed values for hash {0}")]
    PackedValuesNotFound(Felt),
    #[error("no nullifier keys for account {0}")]
    NullifierKeysNotFound(Address),
    #[error("no contract instance at address {0}")]
    ContractInstanceNotFound(Address),
    #[error("function {selector} not found in contract {contract}")]
    FunctionArtifactNotFound {
        contract: Address,
        selector: FunctionSelector,
    },
    #[error("no pending note with inner note hash {inner_note_hash} in contract {contract}")]
    PendingNoteNotFound { contract: Address, inner_note_hash: Felt },
    #[error("nullifier {inner_nullifier} of contract {contract} does not match any note read")]
    NullifiedNoteNotFound { contract: Address, inner_nullifier: Felt },

    // ENCODING
    // --------------------------------------------------------------------------------------------
    #[error("unknown oracle `{0}`")]
    UnknownOracle(String),
    #[error("oracle `{oracle}` expects an input at position {index}")]
    MissingInput { oracle: String, index: usize },
    #[error("oracle `{oracle}` received a malformed input")]
    InvalidInput {
        oracle: String,
        #[source]
        source: FieldDecodingError,
    },
    #[error("notes should all be the same length: expected {expected} items, found {actual}")]
    NoteLengthMismatch { expected: usize, actual: usize },
    #[error("return data size too big: maximum {max} fields, got {actual}")]
    ReturnDataTooLarge { max: usize, actual: usize },
    #[error("invalid note filter")]
    InvalidNoteFilter(#[source] NoteError),

    // CONTRACT INTERFACE
    // --------------------------------------------------------------------------------------------
    #[error("nullifier {inner_nullifier} of contract {contract} was already emitted")]
    NoteAlreadyNullified { contract: Address, inner_nullifier: Felt },
    #[error("side-effect counter {got} does not follow the last issued counter {last}")]
    SideEffectCounterOutOfOrder { last: u32, got: u32 },
    #[error("static call to {selector} of contract {contract} produced side effects")]
    StaticCallSideEffects {
        contract: Address,
        selector: FunctionSelector,
    },
    #[error("cannot call {actual} function {selector} of contract {contract} as {expected}")]
    UnexpectedFunctionType {
        contract: Address,
        selector: FunctionSelector,
        expected: FunctionType,
        actual: FunctionType,
    },
    #[error("call depth exceeds the maximum of {0}")]
    MaxCallDepthExceeded(usize),

    // NESTED
    // --------------------------------------------------------------------------------------------
    #[error("nested call failed")]
    NestedCallFailed(#[source] Box<SimulationError>),
    #[error("failed to fetch data from the data store")]
    DataStore(#[from] DataStoreError),
}

impl OracleError {
    /// Creates an [`OracleError::InvalidInput`] for the named oracle.
    pub fn invalid_input(oracle: &str, source: FieldDecodingError) -> Self {
        Self::InvalidInput { oracle: oracle.into(), source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CapabilityUnavailable(_) => ErrorKind::CapabilityUnavailable,
            Self::MembershipWitnessNotFound { .. }
            | Self::SiblingPathNotFound { .. }
            | Self::NullifierWitnessNotFound { .. }
            | Self::LowNullifierWitnessNotFound { .. }
            | Self::PublicDataWitnessNotFound { .. }
            | Self::BlockHeaderNotFound(_)
            | Self::AuthWitnessNotFound(_)
            | Self::NoCapsulesAvailable
            | Self::L1ToL2MessageNotFound(_)
            | Self::PackedValuesNotFound(_)
            | Self::NullifierKeysNotFound(_)
            | Self::ContractInstanceNotFound(_)
            | Self::FunctionArtifactNotFound { .. }
            | Self::PendingNoteNotFound { .. }
            | Self::NullifiedNoteNotFound { .. } => ErrorKind::NotFound,
            Self::UnknownOracle(_)
            | Self::MissingInput { .. }
            | Self::InvalidInput { .. }
            | Self::NoteLengthMismatch { .. }
            | Self::ReturnDataTooLarge { .. }
            | Self::InvalidNoteFilter(_) => ErrorKind::EncodingViolation,
            Self::NoteAlreadyNullified { .. }
            | Self::SideEffectCounterOutOfOrder { .. }
            | Self::StaticCallSideEffects { .. }
            | Self::MaxCallDepthExceeded(_) => ErrorKind::ContractInterfaceViolation,
            Self::UnexpectedFunctionType { .. } => ErrorKind::WrongFunctionKind,
            Self::NestedCallFailed(inner) => inner.kind(),
            Self::DataStore(_) => ErrorKind::DataSource,
        }
    }
}

// RUNTIME ERROR
// ================================================================================================

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("foreign call `{name}` failed")]
    ForeignCall {
        name: String,
        #[source]
        source: OracleError,
    },
    #[error("function execution failed: {0}")]
    ExecutionFailed(String),
    /// Custom error variant for implementors of the
    /// [`FunctionRuntime`](crate::FunctionRuntime) trait.
    #[error("{error_msg}")]
    Other {
        error_msg: Box<str>,
        source: Option<Box<dyn Error + Send + Sync + 'static>>,
    },
}

impl RuntimeError {
    /// Wraps the failure of the oracle `name`.
    pub fn foreign_call(name: impl Into<String>, source: OracleError) -> Self {
        Self::ForeignCall { name: name.into(), source }
    }

    /// Creates a custom error using the [`RuntimeError::Other`] variant from an error message.
    pub fn other(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::Other { error_msg: message.into(), source: None }
    }

    /// Creates a custom error using the [`RuntimeError::Other`] variant from an error message and
    /// a source error.
    pub fn other_with_source(
        message: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        let message: String = message.into();
        Self::Other {
            error_msg: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ForeignCall { source, .. } => source.kind(),
            Self::ExecutionFailed(_) | Self::Other { .. } => ErrorKind::Runtime,
        }
    }
}

// EXECUTION ERROR
// ================================================================================================

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("function `{name}` is {actual} but was invoked as {expected}")]
    WrongFunctionKind {
        name: String,
        expected: FunctionType,
        actual: FunctionType,
    },
    #[error("contract {contract} does not export mandatory function `{name}`")]
    MissingMandatoryFunction { contract: Address, name: &'static str },
    #[error("function `{name}` expects {expected} parameters but declares {actual}")]
    UnexpectedParameterCount {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("failed to determine the note capacity")]
    InvalidNoteCapacity(#[source] AbiError),
    #[error("note has {note_len} items but the function accepts at most {capacity}")]
    NoteExceedsCapacity { note_len: usize, capacity: usize },
    #[error("function `{name}` returned {actual} values but {expected} were expected")]
    UnexpectedReturnLength {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("function expects {expected} argument fields but received {actual}")]
    InvalidArgumentsSize { expected: usize, actual: usize },
    #[error("oracle call failed")]
    Oracle(#[from] OracleError),
    #[error("function runtime failed")]
    Runtime(#[from] RuntimeError),
    #[error("failed to fetch data from the data store")]
    DataStore(#[from] DataStoreError),
}

impl ExecutionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::WrongFunctionKind { .. } => ErrorKind::WrongFunctionKind,
            Self::MissingMandatoryFunction { .. }
            | Self::UnexpectedParameterCount { .. }
            | Self::InvalidNoteCapacity(_)
            | Self::NoteExceedsCapacity { .. } => ErrorKind::ContractInterfaceViolation,
            Self::UnexpectedReturnLength { .. } | Self::InvalidArgumentsSize { .. } => {
                ErrorKind::EncodingViolation
            },
            Self::Oracle(err) => err.kind(),
            Self::Runtime(err) => err.kind(),
            Self::DataStore(_) => ErrorKind::DataSource,
        }
    }
}

// SIMULATION ERROR
// ================================================================================================

/// The single error surfaced by the [`Simulator`](crate::Simulator).
///
/// Carries the context of the call in which the failure originated. A failure inside a nested
/// call keeps the context of the innermost call rather than that of its callers.
#[derive(Debug, Error)]
#[error("simulation failed{}", CallSite(.call_context))]
pub struct SimulationError {
    call_context: Option<CallContext>,
    source: ExecutionError,
}

impl SimulationError {
    pub fn new(call_context: Option<CallContext>, source: ExecutionError) -> Self {
        match source {
            ExecutionError::Oracle(OracleError::NestedCallFailed(inner))
            | ExecutionError::Runtime(RuntimeError::ForeignCall {
                source: OracleError::NestedCallFailed(inner),
                ..
            }) => *inner,
            source => Self { call_context, source },
        }
    }

    /// Returns the context of the call in which the failure originated, if a call was started.
    pub fn call_context(&self) -> Option<&CallContext> {
        self.call_context.as_ref()
    }

    pub fn error(&self) -> &ExecutionError {
        &self.source
    }

    pub fn into_error(self) -> ExecutionError {
        self.source
    }

    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}

struct CallSite<'a>(&'a Option<CallContext>);

impl Display for CallSite<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(context) => write!(
                f,
                " in function {} of contract {}",
                context.function_selector, context.storage_contract_address
            ),
            None => Ok(()),
        }
    }
}


#[cfg(test)]
mod tests {
    use alloc::boxed::Box;

    use super::*;

    #[test]
    fn nested_failures_keep_the_innermost_call_context() {
        let inner_context = CallContext { side_effect_counter: 7, ..Default::default() };
        let inner = SimulationError::new(
            Some(inner_context),
            OracleError::NoteAlreadyNullified {
                contract: Address::ZERO,
                inner_nullifier: Felt::new(1),
            }
            .into(),
        );

        let outer = SimulationError::new(
            Some(CallContext::default()),
            RuntimeError::foreign_call("callPrivateFunction", OracleError::NestedCallFailed(Box::new(inner)))
                .into(),
        );

        assert_eq!(outer.call_context(), Some(&inner_context));
        assert_eq!(outer.kind(), ErrorKind::ContractInterfaceViolation);
    }
}
