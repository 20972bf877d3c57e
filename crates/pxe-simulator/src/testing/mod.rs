//! In-memory providers for testing code which runs on the simulator.
//!
//! Functions are scripted as Rust closures registered with a [MockRuntime]. Inside a closure,
//! a [PrivateContextStub] speaks the oracle protocol the way a compiled private function would.

use alloc::vec::Vec;

use pxe_objects::{
    Felt, Hasher,
    abi::{AbiParameter, AbiType, FunctionArtifact, FunctionType},
};

mod cipher;
pub use cipher::MockCipher;

mod data_store;
pub use data_store::MockDataStore;

mod oracle;
pub use oracle::InMemoryOracle;

mod runtime;
pub use runtime::{
    MockRuntime, PrivateContextStub, PrivateFunction, RetrievedNote, UnconstrainedFunction,
    string_to_fields,
};

/// Inner note hash used by the mock providers: the first element of the RPO hash of the items.
pub fn mock_inner_note_hash(items: &[Felt]) -> Felt {
    Hasher::hash_elements(items).as_elements()[0]
}

/// Builds an artifact whose bytecode is the function name, taking `num_args` scalar fields.
///
/// Register the function body with [MockRuntime] under the same name.
pub fn mock_artifact(name: &str, function_type: FunctionType, num_args: usize) -> FunctionArtifact {
    let parameters: Vec<AbiParameter> = (0..num_args)
        .map(|i| AbiParameter::new(format!("arg{i}"), AbiType::Field))
        .collect();
    FunctionArtifact::new(name, function_type, parameters, name.as_bytes().to_vec(), Vec::new())
}
