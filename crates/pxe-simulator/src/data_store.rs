use alloc::vec::Vec;

use pxe_objects::{
    Felt,
    abi::FunctionArtifact,
    address::{Address, CompleteAddress, ContractInstance, FunctionSelector, NullifierKeys},
    block::{BlockHeader, MerkleTreeId},
    crypto::merkle::MerklePath,
    note::{NoteData, NoteStatus},
    witness::{MessageLoadOracleInputs, NullifierMembershipWitness, PublicDataWitness},
};

use crate::DataStoreError;

// DATA STORE TRAIT
// ================================================================================================

/// The [DataStore] trait defines the interface the simulator uses to fetch the chain state,
/// contract code and account secrets required to execute functions.
///
/// Lookups return `Ok(None)` when the requested record does not exist. Whether absence is an
/// error is decided by the caller: some oracles fail on it, others substitute defaults.
///
/// All methods take `&self`; implementations needing to mutate state (such as consuming
/// capsules) are expected to use interior mutability.
pub trait DataStore {
    /// Returns the latest block header known to the store. Functions are executed against it.
    fn get_header(&self) -> Result<BlockHeader, DataStoreError>;

    /// Returns the header of the block with the specified number.
    fn get_block_header(&self, block_number: u32) -> Result<Option<BlockHeader>, DataStoreError>;

    /// Returns the artifact of the function with the specified selector in a contract.
    fn get_function_artifact(
        &self,
        contract_address: Address,
        selector: FunctionSelector,
    ) -> Result<Option<FunctionArtifact>, DataStoreError>;

    /// Returns the artifact of the function with the specified name in a contract.
    fn get_function_artifact_by_name(
        &self,
        contract_address: Address,
        name: &str,
    ) -> Result<Option<FunctionArtifact>, DataStoreError>;

    /// Returns the committed notes of a contract at the specified storage slot.
    ///
    /// Notes nullified on chain are returned only for [NoteStatus::ActiveOrNullified].
    fn get_notes(
        &self,
        contract_address: Address,
        storage_slot: Felt,
        status: NoteStatus,
    ) -> Result<Vec<NoteData>, DataStoreError>;

    /// Returns the nullifier keys of an account scoped to the specified contract.
    fn get_nullifier_keys(
        &self,
        account: Address,
        contract_address: Address,
    ) -> Result<Option<NullifierKeys>, DataStoreError>;

    fn get_complete_address(
        &self,
        address: Address,
    ) -> Result<Option<CompleteAddress>, DataStoreError>;

    fn get_contract_instance(
        &self,
        address: Address,
    ) -> Result<Option<ContractInstance>, DataStoreError>;

    /// Returns the auth witness registered for the specified message hash.
    fn get_auth_witness(&self, message_hash: Felt) -> Result<Option<Vec<Felt>>, DataStoreError>;

    /// Removes and returns the most recently added capsule.
    fn pop_capsule(&self) -> Result<Option<Vec<Felt>>, DataStoreError>;

    // TREE QUERIES
    // --------------------------------------------------------------------------------------------

    /// Returns the index of a leaf in a tree at the specified block.
    fn find_leaf_index(
        &self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf: Felt,
    ) -> Result<Option<u64>, DataStoreError>;

    fn get_sibling_path(
        &self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf_index: u64,
    ) -> Result<Option<MerklePath>, DataStoreError>;

    fn get_nullifier_membership_witness(
        &self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, DataStoreError>;

    /// Returns the witness of the leaf with the largest nullifier smaller than `nullifier`,
    /// proving that `nullifier` itself is not in the tree.
    fn get_low_nullifier_membership_witness(
        &self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, DataStoreError>;

    fn get_public_data_tree_witness(
        &self,
        block_number: u32,
        leaf_slot: Felt,
    ) -> Result<Option<PublicDataWitness>, DataStoreError>;

    /// Returns the leaf index of a siloed nullifier in the latest nullifier tree.
    fn get_nullifier_index(&self, siloed_nullifier: Felt) -> Result<Option<u64>, DataStoreError>;

    fn get_l1_to_l2_membership_witness(
        &self,
        contract_address: Address,
        message_hash: Felt,
        secret: Felt,
    ) -> Result<Option<MessageLoadOracleInputs>, DataStoreError>;

    /// Returns the value of a public storage leaf, zero if it was never written.
    fn get_public_storage_at(
        &self,
        block_number: u32,
        leaf_slot: Felt,
    ) -> Result<Felt, DataStoreError>;
}
