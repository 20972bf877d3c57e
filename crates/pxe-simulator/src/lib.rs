#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub use pxe_objects::{
    Felt, Word,
    transaction::{FunctionCall, TxExecutionRequest},
};

mod data_store;
pub use data_store::DataStore;

mod runtime;
pub use runtime::{ForeignCallHandler, FunctionRuntime, PrivateExecutionOutput};

mod crypto;
pub use crypto::SymmetricCipher;

pub mod oracle;
pub use oracle::{DataOracle, OracleAdapter, ViewDataOracle};

pub mod context;
pub use context::{ExecutionContext, NoteCache, SideEffectCounter};

mod execution_result;
pub use execution_result::{
    ExecutionResult, collect_encrypted_logs, collect_enqueued_public_function_calls,
    collect_nullified_note_hash_counters, collect_unencrypted_logs,
};

mod simulator;
pub use simulator::{NoteHashAndNullifier, Simulator, SimulatorOptions};

mod errors;
pub use errors::{
    DataStoreError, ErrorKind, ExecutionError, OracleError, RuntimeError, SimulationError,
};

#[cfg(any(feature = "testing", test))]
pub mod testing;
