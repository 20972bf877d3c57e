extern crate alloc;

mod aggregation;
mod calls;
mod note_hashes;
mod notes;

use std::{collections::BTreeMap, sync::Arc};

use pxe_objects::{
    Felt,
    abi::{FunctionArtifact, FunctionType},
    address::{Address, FunctionSelector},
    block::BlockHeader,
    transaction::{FunctionData, TxContext, TxExecutionRequest},
};
use pxe_simulator::{
    ExecutionResult, ForeignCallHandler, RuntimeError, SimulationError, Simulator,
    SimulatorOptions,
    testing::{MockDataStore, MockRuntime, PrivateContextStub, mock_artifact},
};

// CONSTANTS
// ================================================================================================

pub const CONTRACT: Address = Address::new(Felt::new(100));
pub const OTHER_CONTRACT: Address = Address::new(Felt::new(200));
pub const SENDER: Address = Address::new(Felt::new(7));
pub const BLOCK_NUMBER: u32 = 5;

// TEST CHAIN
// ================================================================================================

/// Collects contract functions and chain state, then builds a [Simulator] over them.
pub struct TestChain {
    pub data_store: MockDataStore,
    runtime: MockRuntime,
    entry_points: BTreeMap<String, (Address, FunctionArtifact)>,
    options: SimulatorOptions,
}

impl TestChain {
    pub fn new() -> Self {
        Self {
            data_store: MockDataStore::new(BlockHeader::empty(BLOCK_NUMBER)),
            runtime: MockRuntime::new(),
            entry_points: BTreeMap::new(),
            options: SimulatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SimulatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Deploys a private function with `num_args` field arguments and returns its selector.
    ///
    /// Function names double as bytecode, so they must be unique across contracts.
    pub fn add_private(
        &mut self,
        contract: Address,
        name: &str,
        num_args: usize,
        body: impl Fn(&mut PrivateContextStub<'_>) -> Result<Vec<Felt>, RuntimeError>
        + Send
        + Sync
        + 'static,
    ) -> FunctionSelector {
        let artifact = mock_artifact(name, FunctionType::Private, num_args);
        self.runtime.add_private_function(name, body);
        self.deploy(contract, artifact)
    }

    pub fn add_public(&mut self, contract: Address, name: &str, num_args: usize) -> FunctionSelector {
        self.deploy(contract, mock_artifact(name, FunctionType::Public, num_args))
    }

    pub fn add_unconstrained(
        &mut self,
        contract: Address,
        artifact: FunctionArtifact,
        body: impl Fn(&[Felt], &mut dyn ForeignCallHandler) -> Result<Vec<Felt>, RuntimeError>
        + Send
        + Sync
        + 'static,
    ) -> FunctionSelector {
        self.runtime.add_unconstrained_function(artifact.bytecode().to_vec(), body);
        self.deploy(contract, artifact)
    }

    pub fn build(self) -> TestSimulator {
        let simulator = Simulator::new(Arc::new(self.data_store), Arc::new(self.runtime))
            .with_options(self.options);
        TestSimulator { simulator, entry_points: self.entry_points }
    }

    fn deploy(&mut self, contract: Address, artifact: FunctionArtifact) -> FunctionSelector {
        let selector = artifact.selector();
        self.data_store.add_artifact(contract, artifact.clone());
        self.entry_points.insert(artifact.name().to_string(), (contract, artifact));
        selector
    }
}

// TEST SIMULATOR
// ================================================================================================

pub struct TestSimulator {
    pub simulator: Simulator,
    entry_points: BTreeMap<String, (Address, FunctionArtifact)>,
}

impl TestSimulator {
    /// Builds a request for the function `name` sent by its own contract.
    pub fn request(&self, name: &str, args: Vec<Felt>) -> TxExecutionRequest {
        let (contract, artifact) = &self.entry_points[name];
        TxExecutionRequest::new(
            *contract,
            FunctionData::new(artifact.selector(), true),
            args,
            TxContext::new(Felt::new(1), Felt::new(1)),
        )
    }

    pub fn run(&self, name: &str, args: Vec<Felt>) -> Result<ExecutionResult, SimulationError> {
        self.run_request(name, self.request(name, args))
    }

    pub fn run_request(
        &self,
        name: &str,
        request: TxExecutionRequest,
    ) -> Result<ExecutionResult, SimulationError> {
        let (contract, artifact) = &self.entry_points[name];
        self.simulator.run(request, artifact, *contract, SENDER)
    }
}

// HELPERS
// ================================================================================================

pub fn felts(values: &[u64]) -> Vec<Felt> {
    values.iter().copied().map(Felt::new).collect()
}

/// Returns the selector a function deployed with [TestChain::add_private] will have.
pub fn private_selector(name: &str, num_args: usize) -> FunctionSelector {
    mock_artifact(name, FunctionType::Private, num_args).selector()
}
