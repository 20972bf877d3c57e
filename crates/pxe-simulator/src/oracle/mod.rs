//! The data oracle: everything an executing function may ask of its host.
//!
//! Functions reach the host through oracle calls. The [OracleAdapter] decodes those calls from
//! their wire form and forwards them to a [DataOracle]. Which capabilities are available depends
//! on the provider: private execution supports the full set, view execution is read-only and
//! tests use an in-memory provider.

use alloc::vec::Vec;

use pxe_objects::{
    AES128_KEY_SIZE, Felt,
    address::{Address, CompleteAddress, ContractInstance, NullifierKeys},
    block::{BlockHeader, MerkleTreeId},
    crypto::merkle::MerklePath,
    logs::{EncryptedL2Log, UnencryptedL2Log},
    note::{NoteData, NoteFilter, NoteStatus},
    transaction::{CallInvocation, PrivateCallStackItem, PublicCallRequest},
    witness::{MessageLoadOracleInputs, NullifierMembershipWitness, PublicDataWitness},
};

use crate::OracleError;

mod adapter;
pub use adapter::OracleAdapter;

mod view;
pub use view::ViewDataOracle;

// DATA ORACLE
// ================================================================================================

/// Capabilities a host provides to an executing function.
///
/// Every method fails with [OracleError::CapabilityUnavailable] unless the provider overrides
/// it. Lookups return `Ok(None)` when the record does not exist; the adapter decides whether
/// absence is an error.
#[allow(unused_variables)]
pub trait DataOracle {
    // RANDOMNESS & PACKED VALUES
    // --------------------------------------------------------------------------------------------

    fn get_random_field(&mut self) -> Result<Felt, OracleError> {
        Err(OracleError::CapabilityUnavailable("getRandomField"))
    }

    /// Stores `values` and returns their hash.
    fn pack_arguments(&mut self, values: &[Felt]) -> Result<Felt, OracleError> {
        Err(OracleError::CapabilityUnavailable("packArguments"))
    }

    fn pack_returns(&mut self, values: &[Felt]) -> Result<Felt, OracleError> {
        Err(OracleError::CapabilityUnavailable("packReturns"))
    }

    /// Returns the values previously stored under `returns_hash`.
    fn unpack_returns(&mut self, returns_hash: Felt) -> Result<Vec<Felt>, OracleError> {
        Err(OracleError::CapabilityUnavailable("unpackReturns"))
    }

    // KEYS & CONTRACTS
    // --------------------------------------------------------------------------------------------

    /// Returns the nullifier keys of `account` for the contract being executed.
    fn get_nullifier_keys(
        &mut self,
        account: Address,
    ) -> Result<Option<NullifierKeys>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getNullifierKeys"))
    }

    fn get_complete_address(
        &mut self,
        address: Address,
    ) -> Result<Option<CompleteAddress>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getPublicKeysAndPartialAddress"))
    }

    fn get_contract_instance(
        &mut self,
        address: Address,
    ) -> Result<Option<ContractInstance>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getContractInstance"))
    }

    // TREE WITNESSES
    // --------------------------------------------------------------------------------------------

    /// Returns the index of `leaf` in a tree together with its sibling path.
    fn get_membership_witness(
        &mut self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf: Felt,
    ) -> Result<Option<(u64, MerklePath)>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getMembershipWitness"))
    }

    fn get_sibling_path(
        &mut self,
        block_number: u32,
        tree_id: MerkleTreeId,
        leaf_index: u64,
    ) -> Result<Option<MerklePath>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getSiblingPath"))
    }

    fn get_nullifier_membership_witness(
        &mut self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getNullifierMembershipWitness"))
    }

    fn get_low_nullifier_membership_witness(
        &mut self,
        block_number: u32,
        nullifier: Felt,
    ) -> Result<Option<NullifierMembershipWitness>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getLowNullifierMembershipWitness"))
    }

    fn get_public_data_tree_witness(
        &mut self,
        block_number: u32,
        leaf_slot: Felt,
    ) -> Result<Option<PublicDataWitness>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getPublicDataTreeWitness"))
    }

    fn get_header(&mut self, block_number: u32) -> Result<Option<BlockHeader>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getHeader"))
    }

    fn get_l1_to_l2_membership_witness(
        &mut self,
        contract_address: Address,
        message_hash: Felt,
        secret: Felt,
    ) -> Result<Option<MessageLoadOracleInputs>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getL1ToL2MembershipWitness"))
    }

    // AUTH WITNESSES & CAPSULES
    // --------------------------------------------------------------------------------------------

    fn get_auth_witness(&mut self, message_hash: Felt) -> Result<Option<Vec<Felt>>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getAuthWitness"))
    }

    fn pop_capsule(&mut self) -> Result<Option<Vec<Felt>>, OracleError> {
        Err(OracleError::CapabilityUnavailable("popCapsule"))
    }

    // NOTES & NULLIFIERS
    // --------------------------------------------------------------------------------------------

    /// Returns the notes of the executing contract at `storage_slot` which pass `filter`.
    fn get_notes(
        &mut self,
        storage_slot: Felt,
        filter: &NoteFilter,
        status: NoteStatus,
    ) -> Result<Vec<NoteData>, OracleError> {
        Err(OracleError::CapabilityUnavailable("getNotes"))
    }

    fn notify_created_note(
        &mut self,
        storage_slot: Felt,
        note_type_id: Felt,
        items: Vec<Felt>,
        inner_note_hash: Felt,
        counter: u32,
    ) -> Result<(), OracleError> {
        Err(OracleError::CapabilityUnavailable("notifyCreatedNote"))
    }

    fn notify_nullified_note(
        &mut self,
        inner_nullifier: Felt,
        inner_note_hash: Felt,
        counter: u32,
    ) -> Result<(), OracleError> {
        Err(OracleError::CapabilityUnavailable("notifyNullifiedNote"))
    }

    /// Returns true if the nullifier exists on chain or was emitted in this transaction.
    fn check_nullifier_exists(&mut self, inner_nullifier: Felt) -> Result<bool, OracleError> {
        Err(OracleError::CapabilityUnavailable("checkNullifierExists"))
    }

    // PUBLIC STORAGE
    // --------------------------------------------------------------------------------------------

    /// Reads `num_values` consecutive public storage slots starting at `start_slot`.
    fn storage_read(
        &mut self,
        start_slot: Felt,
        num_values: usize,
    ) -> Result<Vec<Felt>, OracleError> {
        Err(OracleError::CapabilityUnavailable("storageRead"))
    }

    /// Writes consecutive public storage slots and returns the written values.
    fn storage_write(
        &mut self,
        start_slot: Felt,
        values: &[Felt],
    ) -> Result<Vec<Felt>, OracleError> {
        Err(OracleError::CapabilityUnavailable("storageWrite"))
    }

    // LOGS
    // --------------------------------------------------------------------------------------------

    /// Records an encrypted log and returns its hash.
    fn emit_encrypted_log(&mut self, log: EncryptedL2Log) -> Result<Felt, OracleError> {
        Err(OracleError::CapabilityUnavailable("emitEncryptedLog"))
    }

    /// Records an unencrypted log and returns its hash.
    fn emit_unencrypted_log(&mut self, log: UnencryptedL2Log) -> Result<Felt, OracleError> {
        Err(OracleError::CapabilityUnavailable("emitUnencryptedLog"))
    }

    // CALLS
    // --------------------------------------------------------------------------------------------

    /// Executes a nested private call to completion and returns its call stack item.
    fn call_private_function(
        &mut self,
        invocation: CallInvocation,
    ) -> Result<PrivateCallStackItem, OracleError> {
        Err(OracleError::CapabilityUnavailable("callPrivateFunction"))
    }

    /// Executes a public function immediately. No provider supports this: private functions can
    /// only enqueue public calls.
    fn call_public_function(
        &mut self,
        invocation: CallInvocation,
    ) -> Result<Vec<Felt>, OracleError> {
        Err(OracleError::CapabilityUnavailable("callPublicFunction"))
    }

    /// Records a public call to be executed after the private part of the transaction.
    fn enqueue_public_function_call(
        &mut self,
        invocation: CallInvocation,
    ) -> Result<PublicCallRequest, OracleError> {
        Err(OracleError::CapabilityUnavailable("enqueuePublicFunctionCall"))
    }

    // CRYPTOGRAPHY
    // --------------------------------------------------------------------------------------------

    fn aes128_encrypt(
        &mut self,
        plaintext: &[u8],
        iv: &[u8; AES128_KEY_SIZE],
        key: &[u8; AES128_KEY_SIZE],
    ) -> Result<Vec<u8>, OracleError> {
        Err(OracleError::CapabilityUnavailable("aes128Encrypt"))
    }

    // DEBUGGING
    // --------------------------------------------------------------------------------------------

    /// Returns true if `debugLog` output should be emitted.
    fn debug_enabled(&self) -> bool {
        true
    }
}
