use alloc::vec::Vec;

use pxe_objects::{
    AES128_KEY_SIZE, Felt,
    address::{Address, CompleteAddress, ContractInstance, NullifierKeys},
    block::{BlockHeader, MerkleTreeId},
    crypto::{
        merkle::MerklePath,
        rand::{FeltRng, RpoRandomCoin},
    },
    hash::{compute_public_data_tree_index, silo_nullifier},
    note::{NoteData, NoteFilter, NoteStatus, pick_notes},
    witness::{MessageLoadOracleInputs, NullifierMembershipWitness, PublicDataWitness},
};

use super::DataOracle;
use crate::{DataStore, OracleError, SymmetricCipher};

// VIEW DATA ORACLE
// ================================================================================================

/// Read-only oracle backed by a [DataStore].
///
/// Used to execute unconstrained functions, and as the read path of private execution. It only
/// sees committed state: notes and nullifiers created during the current transaction are
/// invisible to it.
pub struct ViewDataOracle<'a> {
    contract_address: Address,
    historical_header: BlockHeader,
    data_store: &'a dyn DataStore,
    cipher: Option<&'a dyn SymmetricCipher>,
    rng: RpoRandomCoin,
    debug_mode: bool,
}

impl<'a> ViewDataOracle<'a> {
    pub fn new(
        contract_address: Address,
        historical_header: BlockHeader,
        data_store: &'a dyn DataStore,
        cipher: Option<&'a dyn SymmetricCipher>,
        rng: RpoRandomCoin,
        debug_mode: bool,
    ) -> Self {
        Self {
            contract_address,
            historical_header,
            data_store,
            cipher,
            rng,
            debug_mode,
        }
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn historical_header(&self) -> &BlockHeader {
        &self.historical_header
    }

    /// Returns all committed notes of the contract at `storage_slot`, before any filtering.
    pub(crate) fn committed_notes(
        &self,
        storage_slot: Felt,
        status: NoteStatus,
    ) -> Result<Vec<NoteData>, OracleError> {
        Ok(self.data_store.get_notes(self.contract_address, storage_slot, status)?)
    }

    /// Returns true if the siloed nullifier is in the nullifier tree.
    pub(crate) fn is_nullifier_committed(&self, siloed_nullifier: Felt) -> Result<bool, OracleError> {
        Ok(self.data_store.get_nullifier_index(siloed_nullifier)?.is_some())
    }
}

impl DataOracle for ViewDataOracle<'_> {
    fn get_random_field(&mut self) -> Result<Felt, OracleError> {
        Ok(self.rng.draw_element())
    }

    fn get_nullifier_keys(
        &mut self,
        account: Address,
    ) -> Result<Option<NullifierKeys>, OracleError> {
        Ok(self.data_store.get_nullifier_keys(account, self.contract_address)?)
    }

    fn get_complete_address(
        &mut self,
        address: Address,
    ) -> Result<Option<CompleteAddress>, OracleError> {
        Ok(self.data_store.get_complete_address(address)?)
    }

    fn get_contract_instance(
        &mut self,
        address: Address,
    ) -> Result<Option<ContractInstance>, OracleError> {
        Ok(self.data_store.get_contract_instance(address)?)
    }

    fn get_membership_witness(
        &mut self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf: Felt,
    ) -> Result<Option<(u64, MerklePath)>, OracleError> {
        let Some(index) = self.data_store.find_leaf_index(block_number, tree_id, leaf)? else {
            return Ok(None);
        };
        let path = self.data_store.get_sibling_path(block_number, tree_id, index)?;
        Ok(path.map(|path| (index, path)))
    }

    fn get_sibling_path(
        &mut self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf_index: u64,
    ) -> Result<Option<MerklePath>, OracleError> {
        Ok(self.data_store.get_sibling_path(block_number, tree_id, leaf_index)?)
    }

    fn get_nullifier_membership_witness(
        &mut self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, OracleError> {
        Ok(self.data_store.get_nullifier_membership_witness(block_number, nullifier)?)
    }

    fn get_low_nullifier_membership_witness(
        &mut self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, OracleError> {
        Ok(self.data_store.get_low_nullifier_membership_witness(block_number, nullifier)?)
    }

    fn get_public_data_tree_witness(
        &mut self,
        block_number: u32,
        leaf_slot: Felt,
    ) -> Result<Option<PublicDataWitness>, OracleError> {
        Ok(self.data_store.get_public_data_tree_witness(block_number, leaf_slot)?)
    }

    fn get_header(&mut self, block_number: u32) -> Result<Option<BlockHeader>, OracleError> {
        Ok(self.data_store.get_block_header(block_number)?)
    }

    fn get_l1_to_l2_membership_witness(
        &mut self,
        contract_address: Address,
        message_hash: Felt,
        secret: Felt,
    ) -> Result<Option<MessageLoadOracleInputs>, OracleError> {
        Ok(self
            .data_store
            .get_l1_to_l2_membership_witness(contract_address, message_hash, secret)?)
    }

    fn get_auth_witness(&mut self, message_hash: Felt) -> Result<Option<Vec<Felt>>, OracleError> {
        Ok(self.data_store.get_auth_witness(message_hash)?)
    }

    fn pop_capsule(&mut self) -> Result<Option<Vec<Felt>>, OracleError> {
        Ok(self.data_store.pop_capsule()?)
    }

    fn get_notes(
        &mut self,
        storage_slot: Felt,
        filter: &NoteFilter,
        status: NoteStatus,
    ) -> Result<Vec<NoteData>, OracleError> {
        let notes = self.committed_notes(storage_slot, status)?;
        pick_notes(notes, filter).map_err(OracleError::InvalidNoteFilter)
    }

    fn check_nullifier_exists(&mut self, inner_nullifier: Felt) -> Result<bool, OracleError> {
        self.is_nullifier_committed(silo_nullifier(self.contract_address, inner_nullifier))
    }

    fn storage_read(
        &mut self,
        start_slot: Felt,
        num_values: usize,
    ) -> Result<Vec<Felt>, OracleError> {
        let block_number = self.historical_header.block_number();
        (0..num_values as u64)
            .map(|i| {
                let slot = start_slot + Felt::new(i);
                let leaf_slot = compute_public_data_tree_index(self.contract_address, slot);
                Ok(self.data_store.get_public_storage_at(block_number, leaf_slot)?)
            })
            .collect()
    }

    fn aes128_encrypt(
        &mut self,
        plaintext: &[u8],
        iv: &[u8; AES128_KEY_SIZE],
        key: &[u8; AES128_KEY_SIZE],
    ) -> Result<Vec<u8>, OracleError> {
        let cipher = self.cipher.ok_or(OracleError::CapabilityUnavailable("aes128Encrypt"))?;
        Ok(cipher.encrypt_cbc(plaintext, iv, key))
    }

    fn debug_enabled(&self) -> bool {
        self.debug_mode
    }
}
