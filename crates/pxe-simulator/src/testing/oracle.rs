use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};

use pxe_objects::{
    EMPTY_WORD, Felt, StarkField, ZERO,
    address::Address,
    block::BlockHeader,
    crypto::rand::{FeltRng, RpoRandomCoin},
    hash::{compute_public_data_tree_index, silo_nullifier},
    logs::{EncryptedL2Log, UnencryptedL2Log},
    note::{Note, NoteData, NoteFilter, NoteStatus, pick_notes},
};

use super::mock_inner_note_hash;
use crate::{
    DataOracle, NoteCache, OracleError, SideEffectCounter, context::PackedValuesCache,
};

// IN-MEMORY ORACLE
// ================================================================================================

/// A [DataOracle] over plain in-memory state, for exercising functions without a simulator.
///
/// Notes created through the oracle are kept in a [NoteCache] next to the committed notes, so
/// transient note flows behave as they do during private execution. Public storage is writable.
/// Nested calls are not supported.
#[derive(Debug)]
pub struct InMemoryOracle {
    contract_address: Address,
    headers: BTreeMap<u32, BlockHeader>,
    committed_notes: Vec<NoteData>,
    committed_nullifiers: BTreeSet<u64>,
    note_cache: NoteCache,
    packed_values: PackedValuesCache,
    counter: SideEffectCounter,
    public_storage: BTreeMap<u64, Felt>,
    auth_witnesses: BTreeMap<u64, Vec<Felt>>,
    capsules: Vec<Vec<Felt>>,
    rng: RpoRandomCoin,
    encrypted_logs: Vec<EncryptedL2Log>,
    unencrypted_logs: Vec<UnencryptedL2Log>,
}

impl InMemoryOracle {
    /// Creates an empty oracle for functions of `contract_address`. Counters up to and including
    /// `reserved_counter` are taken.
    pub fn new(contract_address: Address, reserved_counter: u32) -> Self {
        Self {
            contract_address,
            headers: BTreeMap::new(),
            committed_notes: Vec::new(),
            committed_nullifiers: BTreeSet::new(),
            note_cache: NoteCache::new(),
            packed_values: PackedValuesCache::default(),
            counter: SideEffectCounter::new(reserved_counter),
            public_storage: BTreeMap::new(),
            auth_witnesses: BTreeMap::new(),
            capsules: Vec::new(),
            rng: RpoRandomCoin::new(EMPTY_WORD),
            encrypted_logs: Vec::new(),
            unencrypted_logs: Vec::new(),
        }
    }

    // MUTATORS
    // --------------------------------------------------------------------------------------------

    pub fn add_header(&mut self, header: BlockHeader) {
        self.headers.insert(header.block_number(), header);
    }

    /// Adds a committed note of the oracle's contract at leaf `index`.
    pub fn add_note(
        &mut self,
        storage_slot: Felt,
        items: Vec<Felt>,
        nonce: Felt,
        inner_nullifier: Felt,
        index: u64,
    ) -> NoteData {
        let note = NoteData {
            inner_note_hash: mock_inner_note_hash(&items),
            note: Note::new(items),
            contract_address: self.contract_address,
            storage_slot,
            nonce,
            siloed_nullifier: Some(silo_nullifier(self.contract_address, inner_nullifier)),
            index: Some(index),
        };
        self.committed_notes.push(note.clone());
        note
    }

    /// Marks a siloed nullifier as committed on chain.
    pub fn add_nullifier(&mut self, siloed_nullifier: Felt) {
        self.committed_nullifiers.insert(siloed_nullifier.as_int());
    }

    pub fn add_auth_witness(&mut self, message_hash: Felt, witness: Vec<Felt>) {
        self.auth_witnesses.insert(message_hash.as_int(), witness);
    }

    pub fn add_capsule(&mut self, capsule: Vec<Felt>) {
        self.capsules.push(capsule);
    }

    // ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub fn counter(&self) -> u32 {
        self.counter.last()
    }

    pub fn note_cache(&self) -> &NoteCache {
        &self.note_cache
    }

    pub fn public_storage_at(&self, storage_slot: Felt) -> Felt {
        let leaf_slot = compute_public_data_tree_index(self.contract_address, storage_slot);
        self.public_storage.get(&leaf_slot.as_int()).copied().unwrap_or(ZERO)
    }

    pub fn encrypted_logs(&self) -> &[EncryptedL2Log] {
        &self.encrypted_logs
    }

    pub fn unencrypted_logs(&self) -> &[UnencryptedL2Log] {
        &self.unencrypted_logs
    }

    fn is_committed_nullified(&self, note: &NoteData) -> bool {
        note.siloed_nullifier
            .is_some_and(|nullifier| self.committed_nullifiers.contains(&nullifier.as_int()))
    }

    fn leaf_slot(&self, storage_slot: Felt, offset: u64) -> u64 {
        compute_public_data_tree_index(self.contract_address, storage_slot + Felt::new(offset))
            .as_int()
    }
}

impl DataOracle for InMemoryOracle {
    fn get_random_field(&mut self) -> Result<Felt, OracleError> {
        Ok(self.rng.draw_element())
    }

    fn pack_arguments(&mut self, values: &[Felt]) -> Result<Felt, OracleError> {
        Ok(self.packed_values.pack(values))
    }

    fn pack_returns(&mut self, values: &[Felt]) -> Result<Felt, OracleError> {
        Ok(self.packed_values.pack(values))
    }

    fn unpack_returns(&mut self, returns_hash: Felt) -> Result<Vec<Felt>, OracleError> {
        self.packed_values.unpack(returns_hash)
    }

    fn get_header(&mut self, block_number: u32) -> Result<Option<BlockHeader>, OracleError> {
        Ok(self.headers.get(&block_number).cloned())
    }

    fn get_auth_witness(&mut self, message_hash: Felt) -> Result<Option<Vec<Felt>>, OracleError> {
        Ok(self.auth_witnesses.get(&message_hash.as_int()).cloned())
    }

    fn pop_capsule(&mut self) -> Result<Option<Vec<Felt>>, OracleError> {
        Ok(self.capsules.pop())
    }

    fn get_notes(
        &mut self,
        storage_slot: Felt,
        filter: &NoteFilter,
        status: NoteStatus,
    ) -> Result<Vec<NoteData>, OracleError> {
        let mut notes: Vec<NoteData> = self
            .committed_notes
            .iter()
            .filter(|note| note.storage_slot == storage_slot)
            .filter(|note| status == NoteStatus::ActiveOrNullified || !self.is_committed_nullified(note))
            .filter(|note| {
                !note.siloed_nullifier.is_some_and(|nullifier| {
                    self.note_cache.contains_nullifier(self.contract_address, nullifier)
                })
            })
            .cloned()
            .collect();
        notes.extend(self.note_cache.get_notes(self.contract_address, storage_slot));

        let notes = pick_notes(notes, filter).map_err(OracleError::InvalidNoteFilter)?;
        for note in notes.iter().filter(|note| !note.is_pending()) {
            self.note_cache.record_settled_read(note);
        }
        Ok(notes)
    }

    fn notify_created_note(
        &mut self,
        storage_slot: Felt,
        _note_type_id: Felt,
        items: Vec<Felt>,
        inner_note_hash: Felt,
        counter: u32,
    ) -> Result<(), OracleError> {
        self.counter.observe(counter)?;
        let note = NoteData {
            note: Note::new(items),
            contract_address: self.contract_address,
            storage_slot,
            nonce: ZERO,
            inner_note_hash,
            siloed_nullifier: None,
            index: None,
        };
        self.note_cache.add_new_note(note, counter);
        Ok(())
    }

    fn notify_nullified_note(
        &mut self,
        inner_nullifier: Felt,
        inner_note_hash: Felt,
        counter: u32,
    ) -> Result<(), OracleError> {
        self.counter.observe(counter)?;
        self.note_cache
            .nullify_note(self.contract_address, inner_nullifier, inner_note_hash)?;
        Ok(())
    }

    fn check_nullifier_exists(&mut self, inner_nullifier: Felt) -> Result<bool, OracleError> {
        let siloed_nullifier = silo_nullifier(self.contract_address, inner_nullifier);
        Ok(self.committed_nullifiers.contains(&siloed_nullifier.as_int())
            || self.note_cache.contains_nullifier(self.contract_address, siloed_nullifier))
    }

    fn storage_read(
        &mut self,
        start_slot: Felt,
        num_values: usize,
    ) -> Result<Vec<Felt>, OracleError> {
        Ok((0..num_values as u64)
            .map(|i| {
                let leaf_slot = self.leaf_slot(start_slot, i);
                self.public_storage.get(&leaf_slot).copied().unwrap_or(ZERO)
            })
            .collect())
    }

    fn storage_write(
        &mut self,
        start_slot: Felt,
        values: &[Felt],
    ) -> Result<Vec<Felt>, OracleError> {
        for (i, value) in values.iter().enumerate() {
            let leaf_slot = self.leaf_slot(start_slot, i as u64);
            self.public_storage.insert(leaf_slot, *value);
        }
        Ok(values.to_vec())
    }

    fn emit_encrypted_log(&mut self, log: EncryptedL2Log) -> Result<Felt, OracleError> {
        let hash = log.hash();
        self.encrypted_logs.push(log);
        Ok(hash)
    }

    fn emit_unencrypted_log(&mut self, log: UnencryptedL2Log) -> Result<Felt, OracleError> {
        let hash = log.hash();
        self.unencrypted_logs.push(log);
        Ok(hash)
    }
}

// TESTS
// ================================================================================================
