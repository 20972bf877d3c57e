//! Per-call execution state of a private function.
//!
//! Every private call in a transaction gets its own [ExecutionContext]. The contexts of one
//! transaction share a [TransactionState] (note cache, packed values and side-effect counter),
//! which the parent lends to a child for the duration of a nested call.

use alloc::{boxed::Box, collections::BTreeMap, vec::Vec};

use pxe_objects::{
    AES128_KEY_SIZE, Felt, StarkField, ZERO,
    abi::{FunctionArtifact, FunctionType},
    address::{Address, CompleteAddress, ContractInstance, NullifierKeys},
    block::{BlockHeader, MerkleTreeId},
    crypto::{
        merkle::MerklePath,
        rand::{FeltRng, RpoRandomCoin},
    },
    hash::{compute_unique_note_hash, silo_note_hash, silo_nullifier},
    logs::{
        EncryptedFunctionL2Logs, EncryptedL2Log, UnencryptedFunctionL2Logs, UnencryptedL2Log,
    },
    note::{
        Note, NoteAndSlot, NoteData, NoteFilter, NoteStatus, NullifiedNoteHashCounter, pick_notes,
    },
    transaction::{
        CallContext, CallInvocation, FunctionData, PrivateCallStackItem, PublicCallRequest,
        TxContext,
    },
    witness::{MessageLoadOracleInputs, NullifierMembershipWitness, PublicDataWitness},
};
use tracing::{debug, trace};

use crate::{
    DataOracle, DataStore, ExecutionError, ExecutionResult, FunctionRuntime, OracleError,
    SimulatorOptions, SymmetricCipher, ViewDataOracle, simulator::execute_private_function,
};

mod counter;
pub use counter::SideEffectCounter;

mod note_cache;
pub use note_cache::NoteCache;

mod packed_values;
pub use packed_values::PackedValuesCache;

// TRANSACTION STATE
// ================================================================================================

/// State shared by every call of one transaction.
pub(crate) struct TransactionState {
    pub note_cache: NoteCache,
    pub packed_values: PackedValuesCache,
    pub counter: SideEffectCounter,
    pub rng: RpoRandomCoin,
}

// EXECUTION ENVIRONMENT
// ================================================================================================

/// Read-only inputs shared by every call of one transaction.
pub(crate) struct ExecutionEnvironment<'a> {
    pub data_store: &'a dyn DataStore,
    pub runtime: &'a dyn FunctionRuntime,
    pub cipher: Option<&'a dyn SymmetricCipher>,
    pub options: &'a SimulatorOptions,
    pub historical_header: BlockHeader,
    pub tx_context: TxContext,
    /// Auth witnesses supplied with the request, keyed by request hash.
    pub auth_witnesses: BTreeMap<u64, Vec<Felt>>,
}

// EXECUTION CONTEXT
// ================================================================================================

/// The private data oracle of a single function call.
///
/// Extends the read-only [ViewDataOracle] with the transaction's pending state: notes created and
/// nullified earlier in the transaction are visible to later reads, and nested private calls are
/// executed in place. Everything the call produces is collected here and moved into its
/// [ExecutionResult] once the function returns.
pub struct ExecutionContext<'env, 'tx> {
    env: &'env ExecutionEnvironment<'env>,
    tx: &'tx mut TransactionState,
    view: ViewDataOracle<'env>,
    call_context: CallContext,
    contract_address: Address,
    args_hash: Felt,
    depth: usize,

    pub(crate) new_notes: Vec<NoteAndSlot>,
    pub(crate) nullified_note_hash_counters: Vec<NullifiedNoteHashCounter>,
    /// Leaf indices of settled notes read by this call, keyed by unique siloed note hash.
    pub(crate) settled_reads: BTreeMap<u64, u64>,
    pub(crate) encrypted_logs: EncryptedFunctionL2Logs,
    pub(crate) unencrypted_logs: UnencryptedFunctionL2Logs,
    pub(crate) nested_executions: Vec<ExecutionResult>,
    pub(crate) enqueued_public_calls: Vec<PublicCallRequest>,
}

impl<'env, 'tx> ExecutionContext<'env, 'tx> {
    pub(crate) fn new(
        env: &'env ExecutionEnvironment<'env>,
        tx: &'tx mut TransactionState,
        call_context: CallContext,
        contract_address: Address,
        args_hash: Felt,
        depth: usize,
    ) -> Self {
        let rng = RpoRandomCoin::new(tx.rng.draw_word());
        let view = ViewDataOracle::new(
            call_context.storage_contract_address,
            env.historical_header.clone(),
            env.data_store,
            env.cipher,
            rng,
            env.options.debug_mode(),
        );

        Self {
            env,
            tx,
            view,
            call_context,
            contract_address,
            args_hash,
            depth,
            new_notes: Vec::new(),
            nullified_note_hash_counters: Vec::new(),
            settled_reads: BTreeMap::new(),
            encrypted_logs: EncryptedFunctionL2Logs::default(),
            unencrypted_logs: UnencryptedFunctionL2Logs::default(),
            nested_executions: Vec::new(),
            enqueued_public_calls: Vec::new(),
        }
    }

    // PUBLIC ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub fn call_context(&self) -> &CallContext {
        &self.call_context
    }

    /// Returns the address of the contract whose code is executed.
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Returns the address of the contract whose state is accessed. Differs from
    /// [Self::contract_address] only in delegate calls.
    pub fn storage_address(&self) -> Address {
        self.call_context.storage_contract_address
    }

    pub fn historical_header(&self) -> &BlockHeader {
        &self.env.historical_header
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    // CRATE ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub(crate) fn env(&self) -> &'env ExecutionEnvironment<'env> {
        self.env
    }

    pub(crate) fn tx_mut(&mut self) -> &mut TransactionState {
        &mut *self.tx
    }

    /// Builds the initial witness of the function: the call context, the historical header, the
    /// transaction context and the unpacked arguments.
    pub(crate) fn initial_witness(
        &self,
        artifact: &FunctionArtifact,
    ) -> Result<Vec<Felt>, ExecutionError> {
        let args = self.tx.packed_values.unpack(self.args_hash)?;
        let expected = artifact.arguments_size();
        if args.len() != expected {
            return Err(ExecutionError::InvalidArgumentsSize { expected, actual: args.len() });
        }

        let mut witness = self.call_context.to_fields();
        witness.extend(self.env.historical_header.to_fields());
        witness.extend(self.env.tx_context.to_fields());
        witness.extend(args);
        Ok(witness)
    }

    // HELPERS
    // --------------------------------------------------------------------------------------------

    /// Derives the call context of a call made from this context.
    ///
    /// A delegate call runs the target's code on behalf of this call: sender and storage stay
    /// the same. Static calls stay static all the way down.
    fn derive_call_context(&self, invocation: &CallInvocation) -> CallContext {
        let (msg_sender, storage_contract_address) = if invocation.is_delegate_call {
            (self.call_context.msg_sender, self.call_context.storage_contract_address)
        } else {
            (self.call_context.storage_contract_address, invocation.target)
        };

        CallContext {
            msg_sender,
            storage_contract_address,
            function_selector: invocation.selector,
            is_delegate_call: invocation.is_delegate_call,
            is_static_call: invocation.is_static_call || self.call_context.is_static_call,
            side_effect_counter: invocation.side_effect_counter,
        }
    }

    /// Fetches the artifact of a call target and checks that it has the expected type.
    fn get_target_artifact(
        &self,
        invocation: &CallInvocation,
        expected: FunctionType,
    ) -> Result<FunctionArtifact, OracleError> {
        let artifact = self
            .env
            .data_store
            .get_function_artifact(invocation.target, invocation.selector)?
            .ok_or(OracleError::FunctionArtifactNotFound {
                contract: invocation.target,
                selector: invocation.selector,
            })?;

        if artifact.function_type() != expected {
            return Err(OracleError::UnexpectedFunctionType {
                contract: invocation.target,
                selector: invocation.selector,
                expected,
                actual: artifact.function_type(),
            });
        }
        Ok(artifact)
    }
}

// DATA ORACLE
// ================================================================================================

impl DataOracle for ExecutionContext<'_, '_> {
    fn get_random_field(&mut self) -> Result<Felt, OracleError> {
        self.view.get_random_field()
    }

    fn pack_arguments(&mut self, values: &[Felt]) -> Result<Felt, OracleError> {
        Ok(self.tx.packed_values.pack(values))
    }

    fn pack_returns(&mut self, values: &[Felt]) -> Result<Felt, OracleError> {
        Ok(self.tx.packed_values.pack(values))
    }

    fn unpack_returns(&mut self, returns_hash: Felt) -> Result<Vec<Felt>, OracleError> {
        self.tx.packed_values.unpack(returns_hash)
    }

    fn get_nullifier_keys(
        &mut self,
        account: Address,
    ) -> Result<Option<NullifierKeys>, OracleError> {
        self.view.get_nullifier_keys(account)
    }

    fn get_complete_address(
        &mut self,
        address: Address,
    ) -> Result<Option<CompleteAddress>, OracleError> {
        self.view.get_complete_address(address)
    }

    fn get_contract_instance(
        &mut self,
        address: Address,
    ) -> Result<Option<ContractInstance>, OracleError> {
        self.view.get_contract_instance(address)
    }

    fn get_membership_witness(
        &mut self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf: Felt,
    ) -> Result<Option<(u64, MerklePath)>, OracleError> {
        self.view.get_membership_witness(block_number, tree_id, leaf)
    }

    fn get_sibling_path(
        &mut self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf_index: u64,
    ) -> Result<Option<MerklePath>, OracleError> {
        self.view.get_sibling_path(block_number, tree_id, leaf_index)
    }

    fn get_nullifier_membership_witness(
        &mut self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, OracleError> {
        self.view.get_nullifier_membership_witness(block_number, nullifier)
    }

    fn get_low_nullifier_membership_witness(
        &mut self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, OracleError> {
        self.view.get_low_nullifier_membership_witness(block_number, nullifier)
    }

    fn get_public_data_tree_witness(
        &mut self,
        block_number: u32,
        leaf_slot: Felt,
    ) -> Result<Option<PublicDataWitness>, OracleError> {
        self.view.get_public_data_tree_witness(block_number, leaf_slot)
    }

    fn get_header(&mut self, block_number: u32) -> Result<Option<BlockHeader>, OracleError> {
        self.view.get_header(block_number)
    }

    fn get_l1_to_l2_membership_witness(
        &mut self,
        contract_address: Address,
        message_hash: Felt,
        secret: Felt,
    ) -> Result<Option<MessageLoadOracleInputs>, OracleError> {
        self.view.get_l1_to_l2_membership_witness(contract_address, message_hash, secret)
    }

    /// Auth witnesses supplied with the request take precedence over the data store.
    fn get_auth_witness(&mut self, message_hash: Felt) -> Result<Option<Vec<Felt>>, OracleError> {
        match self.env.auth_witnesses.get(&message_hash.as_int()) {
            Some(witness) => Ok(Some(witness.clone())),
            None => self.view.get_auth_witness(message_hash),
        }
    }

    fn pop_capsule(&mut self) -> Result<Option<Vec<Felt>>, OracleError> {
        self.view.pop_capsule()
    }

    /// Returns committed notes which were not nullified in this transaction, followed by the
    /// notes created in this transaction, filtered by `filter`.
    fn get_notes(
        &mut self,
        storage_slot: Felt,
        filter: &NoteFilter,
        status: NoteStatus,
    ) -> Result<Vec<NoteData>, OracleError> {
        let contract_address = self.storage_address();
        let note_cache = &self.tx.note_cache;

        let mut notes: Vec<NoteData> = self
            .view
            .committed_notes(storage_slot, status)?
            .into_iter()
            .filter(|note| {
                !note
                    .siloed_nullifier
                    .is_some_and(|nullifier| note_cache.contains_nullifier(contract_address, nullifier))
            })
            .collect();
        let num_committed = notes.len();
        notes.extend(note_cache.get_notes(contract_address, storage_slot));
        trace!(
            target: "pxe::context",
            contract = %contract_address,
            num_committed,
            num_pending = notes.len() - num_committed,
            "reading notes"
        );

        let notes = pick_notes(notes, filter).map_err(OracleError::InvalidNoteFilter)?;
        for note in notes.iter() {
            if let Some(index) = note.index {
                self.tx.note_cache.record_settled_read(note);
                let siloed_note_hash = silo_note_hash(note.contract_address, note.inner_note_hash);
                let unique_note_hash = compute_unique_note_hash(note.nonce, siloed_note_hash);
                self.settled_reads.insert(unique_note_hash.as_int(), index);
            }
        }
        Ok(notes)
    }

    fn notify_created_note(
        &mut self,
        storage_slot: Felt,
        note_type_id: Felt,
        items: Vec<Felt>,
        inner_note_hash: Felt,
        counter: u32,
    ) -> Result<(), OracleError> {
        self.tx.counter.observe(counter)?;

        let note = Note::new(items);
        let contract_address = self.storage_address();
        debug!(target: "pxe::context", contract = %contract_address, counter, "note created");

        self.tx.note_cache.add_new_note(
            NoteData {
                note: note.clone(),
                contract_address,
                storage_slot,
                nonce: ZERO,
                inner_note_hash,
                siloed_nullifier: None,
                index: None,
            },
            counter,
        );
        self.new_notes.push(NoteAndSlot { note, storage_slot, note_type_id, counter });
        Ok(())
    }

    fn notify_nullified_note(
        &mut self,
        inner_nullifier: Felt,
        inner_note_hash: Felt,
        counter: u32,
    ) -> Result<(), OracleError> {
        self.tx.counter.observe(counter)?;

        let contract_address = self.storage_address();
        let note_hash_counter =
            self.tx.note_cache.nullify_note(contract_address, inner_nullifier, inner_note_hash)?;
        if let Some(note_hash_counter) = note_hash_counter {
            self.nullified_note_hash_counters
                .push(NullifiedNoteHashCounter { note_hash_counter, nullifier_counter: counter });
        }
        Ok(())
    }

    fn check_nullifier_exists(&mut self, inner_nullifier: Felt) -> Result<bool, OracleError> {
        let contract_address = self.storage_address();
        let siloed_nullifier = silo_nullifier(contract_address, inner_nullifier);
        if self.tx.note_cache.contains_nullifier(contract_address, siloed_nullifier) {
            return Ok(true);
        }
        self.view.is_nullifier_committed(siloed_nullifier)
    }

    fn storage_read(
        &mut self,
        start_slot: Felt,
        num_values: usize,
    ) -> Result<Vec<Felt>, OracleError> {
        self.view.storage_read(start_slot, num_values)
    }

    fn emit_encrypted_log(&mut self, log: EncryptedL2Log) -> Result<Felt, OracleError> {
        let hash = log.hash();
        trace!(target: "pxe::context", contract = %log.contract_address, "encrypted log emitted");
        self.encrypted_logs.push(log);
        Ok(hash)
    }

    fn emit_unencrypted_log(&mut self, log: UnencryptedL2Log) -> Result<Felt, OracleError> {
        let hash = log.hash();
        trace!(target: "pxe::context", contract = %log.contract_address, "unencrypted log emitted");
        self.unencrypted_logs.push(log);
        Ok(hash)
    }

    fn call_private_function(
        &mut self,
        invocation: CallInvocation,
    ) -> Result<PrivateCallStackItem, OracleError> {
        self.tx.counter.observe(invocation.side_effect_counter)?;

        let max_depth = self.env.options.max_call_depth();
        if self.depth >= max_depth {
            return Err(OracleError::MaxCallDepthExceeded(max_depth));
        }

        let artifact = self.get_target_artifact(&invocation, FunctionType::Private)?;
        let call_context = self.derive_call_context(&invocation);
        debug!(
            target: "pxe::context",
            contract = %invocation.target,
            selector = %invocation.selector,
            counter = invocation.side_effect_counter,
            depth = self.depth + 1,
            "calling private function"
        );

        let child = ExecutionContext::new(
            self.env,
            &mut *self.tx,
            call_context,
            invocation.target,
            invocation.args_hash,
            self.depth + 1,
        );
        let result = execute_private_function(child, &artifact)
            .map_err(|err| OracleError::NestedCallFailed(Box::new(err)))?;

        if call_context.is_static_call && result.call_stack_item.public_inputs.has_side_effects() {
            return Err(OracleError::StaticCallSideEffects {
                contract: invocation.target,
                selector: invocation.selector,
            });
        }

        let call_stack_item = result.call_stack_item.clone();
        self.nested_executions.push(result);
        Ok(call_stack_item)
    }

    fn enqueue_public_function_call(
        &mut self,
        invocation: CallInvocation,
    ) -> Result<PublicCallRequest, OracleError> {
        self.tx.counter.observe(invocation.side_effect_counter)?;

        let args = self.tx.packed_values.unpack(invocation.args_hash)?;
        self.get_target_artifact(&invocation, FunctionType::Public)?;
        debug!(
            target: "pxe::context",
            contract = %invocation.target,
            selector = %invocation.selector,
            counter = invocation.side_effect_counter,
            "enqueuing public function call"
        );

        let request = PublicCallRequest {
            contract_address: invocation.target,
            function_data: FunctionData::new(invocation.selector, false),
            call_context: self.derive_call_context(&invocation),
            parent_call_context: self.call_context,
            args,
        };
        self.enqueued_public_calls.push(request.clone());
        Ok(request)
    }

    fn aes128_encrypt(
        &mut self,
        plaintext: &[u8],
        iv: &[u8; AES128_KEY_SIZE],
        key: &[u8; AES128_KEY_SIZE],
    ) -> Result<Vec<u8>, OracleError> {
        self.view.aes128_encrypt(plaintext, iv, key)
    }

    fn debug_enabled(&self) -> bool {
        self.view.debug_enabled()
    }
}
