use alloc::{collections::BTreeMap, vec::Vec};
use core::cell::RefCell;

use pxe_objects::{
    Felt, StarkField, ZERO,
    abi::FunctionArtifact,
    address::{Address, CompleteAddress, ContractInstance, FunctionSelector, NullifierKeys},
    block::{BlockHeader, MerkleTreeId},
    crypto::merkle::MerklePath,
    hash::{compute_public_data_tree_index, silo_nullifier},
    note::{Note, NoteData, NoteStatus},
    witness::{MessageLoadOracleInputs, NullifierMembershipWitness, PublicDataWitness},
};

use super::mock_inner_note_hash;
use crate::{DataStore, DataStoreError};

// MOCK DATA STORE
// ================================================================================================

/// An in-memory [DataStore] populated by tests.
///
/// The latest header is the one with the highest block number. Capsules are consumed in LIFO
/// order.
#[derive(Debug, Default)]
pub struct MockDataStore {
    headers: BTreeMap<u32, BlockHeader>,
    artifacts: BTreeMap<Address, Vec<FunctionArtifact>>,
    notes: Vec<NoteData>,
    nullifier_keys: BTreeMap<Address, NullifierKeys>,
    complete_addresses: BTreeMap<Address, CompleteAddress>,
    contract_instances: BTreeMap<Address, ContractInstance>,
    auth_witnesses: BTreeMap<u64, Vec<Felt>>,
    capsules: RefCell<Vec<Vec<Felt>>>,
    leaves: Vec<(MerkleTreeId, Felt, u64, MerklePath)>,
    nullifiers: BTreeMap<u64, u64>,
    public_storage: BTreeMap<u64, Felt>,
    l1_to_l2_messages: BTreeMap<u64, MessageLoadOracleInputs>,
}

impl MockDataStore {
    /// Creates a store whose latest block is `header`.
    pub fn new(header: BlockHeader) -> Self {
        let mut store = Self::default();
        store.add_header(header);
        store
    }

    pub fn add_header(&mut self, header: BlockHeader) {
        self.headers.insert(header.block_number(), header);
    }

    pub fn add_artifact(&mut self, contract_address: Address, artifact: FunctionArtifact) {
        self.artifacts.entry(contract_address).or_default().push(artifact);
    }

    /// Adds a committed note at leaf `index` of the note hash tree.
    ///
    /// The inner note hash is derived from the items with [mock_inner_note_hash].
    pub fn add_note(
        &mut self,
        contract_address: Address,
        storage_slot: Felt,
        items: Vec<Felt>,
        nonce: Felt,
        inner_nullifier: Felt,
        index: u64,
    ) -> NoteData {
        let note = NoteData {
            inner_note_hash: mock_inner_note_hash(&items),
            note: Note::new(items),
            contract_address,
            storage_slot,
            nonce,
            siloed_nullifier: Some(silo_nullifier(contract_address, inner_nullifier)),
            index: Some(index),
        };
        self.notes.push(note.clone());
        note
    }

    /// Inserts a siloed nullifier into the nullifier tree.
    pub fn add_nullifier(&mut self, siloed_nullifier: Felt, index: u64) {
        self.nullifiers.insert(siloed_nullifier.as_int(), index);
    }

    pub fn add_nullifier_keys(&mut self, account: Address, keys: NullifierKeys) {
        self.nullifier_keys.insert(account, keys);
    }

    pub fn add_complete_address(&mut self, complete_address: CompleteAddress) {
        self.complete_addresses.insert(complete_address.address, complete_address);
    }

    pub fn add_contract_instance(&mut self, address: Address, instance: ContractInstance) {
        self.contract_instances.insert(address, instance);
    }

    pub fn add_auth_witness(&mut self, message_hash: Felt, witness: Vec<Felt>) {
        self.auth_witnesses.insert(message_hash.as_int(), witness);
    }

    pub fn add_capsule(&mut self, capsule: Vec<Felt>) {
        self.capsules.get_mut().push(capsule);
    }

    /// Adds a leaf at `index` of a tree together with its sibling path.
    pub fn add_leaf(&mut self, tree_id: MerkleTreeId, leaf: Felt, index: u64, path: MerklePath) {
        self.leaves.push((tree_id, leaf, index, path));
    }

    pub fn set_public_storage(&mut self, contract_address: Address, storage_slot: Felt, value: Felt) {
        let leaf_slot = compute_public_data_tree_index(contract_address, storage_slot);
        self.public_storage.insert(leaf_slot.as_int(), value);
    }

    pub fn add_l1_to_l2_message(&mut self, message_hash: Felt, inputs: MessageLoadOracleInputs) {
        self.l1_to_l2_messages.insert(message_hash.as_int(), inputs);
    }

    fn is_nullified(&self, note: &NoteData) -> bool {
        note.siloed_nullifier
            .is_some_and(|nullifier| self.nullifiers.contains_key(&nullifier.as_int()))
    }
}

impl DataStore for MockDataStore {
    fn get_header(&self) -> Result<BlockHeader, DataStoreError> {
        self.headers
            .values()
            .next_back()
            .cloned()
            .ok_or_else(|| DataStoreError::other("mock data store has no headers"))
    }

    fn get_block_header(&self, block_number: u32) -> Result<Option<BlockHeader>, DataStoreError> {
        Ok(self.headers.get(&block_number).cloned())
    }

    fn get_function_artifact(
        &self,
        contract_address: Address,
        selector: FunctionSelector,
    ) -> Result<Option<FunctionArtifact>, DataStoreError> {
        Ok(self
            .artifacts
            .get(&contract_address)
            .and_then(|artifacts| artifacts.iter().find(|artifact| artifact.selector() == selector))
            .cloned())
    }

    fn get_function_artifact_by_name(
        &self,
        contract_address: Address,
        name: &str,
    ) -> Result<Option<FunctionArtifact>, DataStoreError> {
        Ok(self
            .artifacts
            .get(&contract_address)
            .and_then(|artifacts| artifacts.iter().find(|artifact| artifact.name() == name))
            .cloned())
    }

    fn get_notes(
        &self,
        contract_address: Address,
        storage_slot: Felt,
        status: NoteStatus,
    ) -> Result<Vec<NoteData>, DataStoreError> {
        Ok(self
            .notes
            .iter()
            .filter(|note| {
                note.contract_address == contract_address && note.storage_slot == storage_slot
            })
            .filter(|note| status == NoteStatus::ActiveOrNullified || !self.is_nullified(note))
            .cloned()
            .collect())
    }

    fn get_nullifier_keys(
        &self,
        account: Address,
        _contract_address: Address,
    ) -> Result<Option<NullifierKeys>, DataStoreError> {
        Ok(self.nullifier_keys.get(&account).copied())
    }

    fn get_complete_address(
        &self,
        address: Address,
    ) -> Result<Option<CompleteAddress>, DataStoreError> {
        Ok(self.complete_addresses.get(&address).cloned())
    }

    fn get_contract_instance(
        &self,
        address: Address,
    ) -> Result<Option<ContractInstance>, DataStoreError> {
        Ok(self.contract_instances.get(&address).cloned())
    }

    fn get_auth_witness(&self, message_hash: Felt) -> Result<Option<Vec<Felt>>, DataStoreError> {
        Ok(self.auth_witnesses.get(&message_hash.as_int()).cloned())
    }

    fn pop_capsule(&self) -> Result<Option<Vec<Felt>>, DataStoreError> {
        Ok(self.capsules.borrow_mut().pop())
    }

    fn find_leaf_index(
        &self,
        _block_number: u32,
        tree_id: MerkleTreeId,
        leaf: Felt,
    ) -> Result<Option<u64>, DataStoreError> {
        Ok(self
            .leaves
            .iter()
            .find(|(id, value, ..)| *id == tree_id && *value == leaf)
            .map(|(_, _, index, _)| *index))
    }

    fn get_sibling_path(
        &self,
        _block_number: u32,
        tree_id: MerkleTreeId,
        leaf_index: u64,
    ) -> Result<Option<MerklePath>, DataStoreError> {
        Ok(self
            .leaves
            .iter()
            .find(|(id, _, index, _)| *id == tree_id && *index == leaf_index)
            .map(|(.., path)| path.clone()))
    }

    fn get_nullifier_membership_witness(
        &self,
        _block_number: u32,
        _nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, DataStoreError> {
        Ok(None)
    }

    fn get_low_nullifier_membership_witness(
        &self,
        _block_number: u32,
        _nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, DataStoreError> {
        Ok(None)
    }

    fn get_public_data_tree_witness(
        &self,
        _block_number: u32,
        _leaf_slot: Felt,
    ) -> Result<Option<PublicDataWitness>, DataStoreError> {
        Ok(None)
    }

    fn get_nullifier_index(&self, siloed_nullifier: Felt) -> Result<Option<u64>, DataStoreError> {
        Ok(self.nullifiers.get(&siloed_nullifier.as_int()).copied())
    }

    fn get_l1_to_l2_membership_witness(
        &self,
        _contract_address: Address,
        message_hash: Felt,
        _secret: Felt,
    ) -> Result<Option<MessageLoadOracleInputs>, DataStoreError> {
        Ok(self.l1_to_l2_messages.get(&message_hash.as_int()).cloned())
    }

    fn get_public_storage_at(
        &self,
        _block_number: u32,
        leaf_slot: Felt,
    ) -> Result<Felt, DataStoreError> {
        Ok(self.public_storage.get(&leaf_slot.as_int()).copied().unwrap_or(ZERO))
    }
}
