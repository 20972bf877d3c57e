use alloc::{sync::Arc, vec::Vec};
use core::sync::atomic::{AtomicU64, Ordering};

use pxe_objects::{
    COMPUTE_NOTE_HASH_AND_NULLIFIER_ARITY, COMPUTE_NOTE_HASH_AND_NULLIFIER_NAME,
    COMPUTE_NOTE_HASH_AND_NULLIFIER_RETURN_LENGTH, Digest, Felt, Hasher,
    INITIAL_SIDE_EFFECT_COUNTER, StarkField, ZERO,
    abi::{FunctionArtifact, FunctionType},
    address::Address,
    crypto::rand::RpoRandomCoin,
    note::Note,
    transaction::{CallContext, FunctionCall, FunctionData, TxExecutionRequest},
};
use tracing::{debug, warn};

use crate::{
    DataStore, ExecutionContext, ExecutionError, ExecutionResult, FunctionRuntime, OracleAdapter,
    SimulationError, SymmetricCipher, ViewDataOracle,
    context::{ExecutionEnvironment, NoteCache, PackedValuesCache, SideEffectCounter, TransactionState},
};

mod execution;
pub(crate) use execution::execute_private_function;

mod options;
pub use options::{DEFAULT_MAX_CALL_DEPTH, SimulatorOptions};

// NOTE HASH AND NULLIFIER
// ================================================================================================

/// Hashes and nullifier of a note as computed by its contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteHashAndNullifier {
    pub inner_note_hash: Felt,
    pub siloed_note_hash: Felt,
    pub unique_siloed_note_hash: Felt,
    pub inner_nullifier: Felt,
}

// SIMULATOR
// ================================================================================================

/// The simulator executes contract functions locally, before a transaction is proven.
///
/// Simulation of a private function consists of the following steps:
/// - Fetch the block header the transaction is executed against from the [DataStore].
/// - Execute the entry point and, recursively, every private function it calls. Each call gets
///   its own [ExecutionContext]; notes, nullifiers and side-effect counters are shared by all
///   calls of the transaction.
/// - Return the [ExecutionResult] tree, from which the kernel prover's inputs are collected.
///
/// The simulator uses dynamic dispatch with trait objects for the [DataStore],
/// [FunctionRuntime] and [SymmetricCipher], allowing it to be used with different backend
/// implementations.
pub struct Simulator {
    data_store: Arc<dyn DataStore>,
    runtime: Arc<dyn FunctionRuntime>,
    cipher: Option<Arc<dyn SymmetricCipher>>,
    options: SimulatorOptions,
    /// Number of runs started so far; mixed into the randomness of each run.
    run_nonce: AtomicU64,
}

impl Simulator {
    // CONSTRUCTORS
    // --------------------------------------------------------------------------------------------

    /// Creates a new [Simulator] with the specified [DataStore] and [FunctionRuntime] and the
    /// default options.
    pub fn new(data_store: Arc<dyn DataStore>, runtime: Arc<dyn FunctionRuntime>) -> Self {
        Self {
            data_store,
            runtime,
            cipher: None,
            options: SimulatorOptions::default(),
            run_nonce: AtomicU64::new(0),
        }
    }

    pub fn with_options(mut self, options: SimulatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the cipher backing the `aes128Encrypt` oracle. Without one, the oracle is
    /// unavailable.
    pub fn with_cipher(mut self, cipher: Arc<dyn SymmetricCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn options(&self) -> &SimulatorOptions {
        &self.options
    }

    // PRIVATE EXECUTION
    // --------------------------------------------------------------------------------------------

    /// Executes the private entry point of a transaction together with every private function it
    /// calls.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The artifact is not a private function.
    /// - The latest block header cannot be fetched from the [DataStore].
    /// - Any function of the call tree fails.
    pub fn run(
        &self,
        request: TxExecutionRequest,
        artifact: &FunctionArtifact,
        contract_address: Address,
        msg_sender: Address,
    ) -> Result<ExecutionResult, SimulationError> {
        check_function_type(artifact, FunctionType::Private)?;
        if request.origin != contract_address {
            warn!(
                target: "pxe::simulator",
                origin = %request.origin,
                contract = %contract_address,
                "request origin does not match the executed contract"
            );
        }

        // the root call starts at the counter reserved for the transaction hash
        let start_counter = INITIAL_SIDE_EFFECT_COUNTER;
        let call_context = CallContext {
            msg_sender,
            storage_contract_address: contract_address,
            function_selector: artifact.selector(),
            is_delegate_call: false,
            is_static_call: false,
            side_effect_counter: start_counter,
        };

        let historical_header = self
            .data_store
            .get_header()
            .map_err(|err| SimulationError::new(Some(call_context), err.into()))?;
        let rng = self.next_rng(request.first_call_args_hash);

        let mut tx = TransactionState {
            note_cache: NoteCache::new(),
            packed_values: PackedValuesCache::new(request.args_of_calls),
            counter: SideEffectCounter::new(start_counter),
            rng,
        };

        let env = ExecutionEnvironment {
            data_store: self.data_store.as_ref(),
            runtime: self.runtime.as_ref(),
            cipher: self.cipher.as_deref(),
            options: &self.options,
            historical_header,
            tx_context: request.tx_context,
            auth_witnesses: request
                .auth_witnesses
                .into_iter()
                .map(|witness| (witness.request_hash.as_int(), witness.witness))
                .collect(),
        };

        debug!(
            target: "pxe::simulator",
            function = artifact.name(),
            contract = %contract_address,
            block_number = env.historical_header.block_number(),
            "simulating private function"
        );

        let context = ExecutionContext::new(
            &env,
            &mut tx,
            call_context,
            contract_address,
            request.first_call_args_hash,
            0,
        );
        let result = execute_private_function(context, artifact)?;
        debug!(
            target: "pxe::simulator",
            num_calls = result.iter_preorder().count(),
            end_counter = tx.counter.last(),
            "private simulation finished"
        );
        Ok(result)
    }

    // UNCONSTRAINED EXECUTION
    // --------------------------------------------------------------------------------------------

    /// Executes an unconstrained function against the latest committed state and returns its
    /// return values.
    pub fn run_unconstrained(
        &self,
        call: FunctionCall,
        artifact: &FunctionArtifact,
        contract_address: Address,
    ) -> Result<Vec<Felt>, SimulationError> {
        check_function_type(artifact, FunctionType::Unconstrained)?;

        let call_context = CallContext {
            storage_contract_address: contract_address,
            function_selector: call.function_data.selector,
            ..Default::default()
        };
        let wrap = |err: ExecutionError| SimulationError::new(Some(call_context), err);

        let historical_header = self.data_store.get_header().map_err(|err| wrap(err.into()))?;
        let mut oracle = ViewDataOracle::new(
            contract_address,
            historical_header,
            self.data_store.as_ref(),
            self.cipher.as_deref(),
            self.next_rng(call.function_data.selector.to_field()),
            self.options.debug_mode(),
        );
        debug!(
            target: "pxe::simulator",
            function = artifact.name(),
            contract = %contract_address,
            "simulating unconstrained function"
        );

        self.runtime
            .execute_unconstrained(artifact, call.args, &mut OracleAdapter::new(&mut oracle))
            .map_err(|err| wrap(err.into()))
    }

    // NOTE HASHES
    // --------------------------------------------------------------------------------------------

    /// Computes the hashes and the nullifier of a note by running the contract's
    /// `compute_note_hash_and_nullifier` function.
    ///
    /// The function receives the note as a fixed-size array: shorter notes are padded with
    /// zeros.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The contract does not export `compute_note_hash_and_nullifier`, or it has an unexpected
    ///   signature.
    /// - The note is longer than the array the function accepts.
    /// - The function fails or returns an unexpected number of values.
    pub fn compute_note_hash_and_nullifier(
        &self,
        contract_address: Address,
        nonce: Felt,
        storage_slot: Felt,
        note_type_id: Felt,
        note: &Note,
    ) -> Result<NoteHashAndNullifier, SimulationError> {
        let mut call_context =
            CallContext { storage_contract_address: contract_address, ..Default::default() };
        let wrap = |call_context: CallContext, err: ExecutionError| {
            SimulationError::new(Some(call_context), err)
        };

        let artifact = self
            .data_store
            .get_function_artifact_by_name(contract_address, COMPUTE_NOTE_HASH_AND_NULLIFIER_NAME)
            .map_err(|err| wrap(call_context, err.into()))?
            .ok_or_else(|| {
                wrap(
                    call_context,
                    ExecutionError::MissingMandatoryFunction {
                        contract: contract_address,
                        name: COMPUTE_NOTE_HASH_AND_NULLIFIER_NAME,
                    },
                )
            })?;
        call_context.function_selector = artifact.selector();

        let num_parameters = artifact.parameters().len();
        if num_parameters != COMPUTE_NOTE_HASH_AND_NULLIFIER_ARITY {
            return Err(wrap(
                call_context,
                ExecutionError::UnexpectedParameterCount {
                    name: artifact.name().into(),
                    expected: COMPUTE_NOTE_HASH_AND_NULLIFIER_ARITY,
                    actual: num_parameters,
                },
            ));
        }

        let capacity = artifact
            .last_parameter_array_length()
            .map_err(|err| wrap(call_context, ExecutionError::InvalidNoteCapacity(err)))?;
        if note.len() > capacity {
            return Err(wrap(
                call_context,
                ExecutionError::NoteExceedsCapacity { note_len: note.len(), capacity },
            ));
        }

        let mut args = vec![contract_address.as_felt(), nonce, storage_slot, note_type_id];
        args.extend_from_slice(note.items());
        args.resize(args.len() + capacity - note.len(), ZERO);

        let call = FunctionCall {
            to: contract_address,
            function_data: FunctionData::new(artifact.selector(), false),
            args,
        };
        let values = self.run_unconstrained(call, &artifact, contract_address)?;

        match values[..] {
            [inner_note_hash, siloed_note_hash, unique_siloed_note_hash, inner_nullifier] => {
                Ok(NoteHashAndNullifier {
                    inner_note_hash,
                    siloed_note_hash,
                    unique_siloed_note_hash,
                    inner_nullifier,
                })
            },
            _ => Err(wrap(
                call_context,
                ExecutionError::UnexpectedReturnLength {
                    name: artifact.name().into(),
                    expected: COMPUTE_NOTE_HASH_AND_NULLIFIER_RETURN_LENGTH,
                    actual: values.len(),
                },
            )),
        }
    }

    /// Computes the inner hash of a note, which does not depend on the nonce.
    pub fn compute_inner_note_hash(
        &self,
        contract_address: Address,
        storage_slot: Felt,
        note_type_id: Felt,
        note: &Note,
    ) -> Result<Felt, SimulationError> {
        self.compute_note_hash_and_nullifier(contract_address, ZERO, storage_slot, note_type_id, note)
            .map(|result| result.inner_note_hash)
    }

    /// Computes the inner hash of a note siloed to its contract.
    pub fn compute_siloed_note_hash(
        &self,
        contract_address: Address,
        storage_slot: Felt,
        note_type_id: Felt,
        note: &Note,
    ) -> Result<Felt, SimulationError> {
        self.compute_note_hash_and_nullifier(contract_address, ZERO, storage_slot, note_type_id, note)
            .map(|result| result.siloed_note_hash)
    }

    /// Computes the hash under which a note with the specified nonce is inserted into the note
    /// hash tree.
    pub fn compute_unique_siloed_note_hash(
        &self,
        contract_address: Address,
        nonce: Felt,
        storage_slot: Felt,
        note_type_id: Felt,
        note: &Note,
    ) -> Result<Felt, SimulationError> {
        self.compute_note_hash_and_nullifier(contract_address, nonce, storage_slot, note_type_id, note)
            .map(|result| result.unique_siloed_note_hash)
    }

    pub fn compute_inner_nullifier(
        &self,
        contract_address: Address,
        nonce: Felt,
        storage_slot: Felt,
        note_type_id: Felt,
        note: &Note,
    ) -> Result<Felt, SimulationError> {
        self.compute_note_hash_and_nullifier(contract_address, nonce, storage_slot, note_type_id, note)
            .map(|result| result.inner_nullifier)
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// Derives the random coin of the next run from the configured seed, a run nonce and
    /// `salt`.
    fn next_rng(&self, salt: Felt) -> RpoRandomCoin {
        let nonce = self.run_nonce.fetch_add(1, Ordering::Relaxed);
        let run_digest = Hasher::hash_elements(&[Felt::new(nonce), salt]);
        let seed = Hasher::merge(&[Digest::new(self.options.rng_seed()), run_digest]);
        RpoRandomCoin::new(seed.into())
    }
}

// HELPER FUNCTIONS
// ================================================================================================

fn check_function_type(
    artifact: &FunctionArtifact,
    expected: FunctionType,
) -> Result<(), SimulationError> {
    let actual = artifact.function_type();
    if actual != expected {
        return Err(SimulationError::new(
            None,
            ExecutionError::WrongFunctionKind { name: artifact.name().into(), expected, actual },
        ));
    }
    Ok(())
}
