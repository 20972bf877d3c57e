//! Logs emitted by private functions.
//!
//! A function only commits to the hash of each log; the preimages travel alongside the
//! transaction, grouped per function call.

use alloc::vec::Vec;

use crate::{
    Felt,
    address::{Address, EventSelector, Point},
    hash::{hash_with_separator, separator},
};

// ENCRYPTED LOG
// ================================================================================================

/// A note preimage addressed to a recipient key.
///
/// The payload is the serialized note; encryption happens when the log is broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedL2Log {
    pub contract_address: Address,
    pub storage_slot: Felt,
    pub note_type_id: Felt,
    pub recipient: Point,
    pub payload: Vec<Felt>,
}

impl EncryptedL2Log {
    pub fn to_fields(&self) -> Vec<Felt> {
        let mut fields = vec![
            self.contract_address.as_felt(),
            self.storage_slot,
            self.note_type_id,
            self.recipient.x,
            self.recipient.y,
        ];
        fields.extend_from_slice(&self.payload);
        fields
    }

    pub fn hash(&self) -> Felt {
        hash_with_separator(separator::ENCRYPTED_LOG, &self.to_fields())
    }
}

// UNENCRYPTED LOG
// ================================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnencryptedL2Log {
    pub contract_address: Address,
    pub selector: EventSelector,
    pub data: Vec<Felt>,
}

impl UnencryptedL2Log {
    pub fn to_fields(&self) -> Vec<Felt> {
        let mut fields = vec![self.contract_address.as_felt(), self.selector.to_field()];
        fields.extend_from_slice(&self.data);
        fields
    }

    pub fn hash(&self) -> Felt {
        hash_with_separator(separator::UNENCRYPTED_LOG, &self.to_fields())
    }
}

// FUNCTION LOGS
// ================================================================================================

/// Logs of a single kind emitted by one function call, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionL2Logs<L> {
    logs: Vec<L>,
}

impl<L> Default for FunctionL2Logs<L> {
    fn default() -> Self {
        Self { logs: Vec::new() }
    }
}

impl<L> FunctionL2Logs<L> {
    pub fn new(logs: Vec<L>) -> Self {
        Self { logs }
    }

    pub fn push(&mut self, log: L) {
        self.logs.push(log);
    }

    pub fn logs(&self) -> &[L] {
        &self.logs
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }
}

impl FunctionL2Logs<EncryptedL2Log> {
    /// Number of field elements needed to transmit every log preimage.
    pub fn serialized_length(&self) -> u64 {
        self.logs.iter().map(|log| log.to_fields().len() as u64).sum()
    }
}

impl FunctionL2Logs<UnencryptedL2Log> {
    pub fn serialized_length(&self) -> u64 {
        self.logs.iter().map(|log| log.to_fields().len() as u64).sum()
    }
}

pub type EncryptedFunctionL2Logs = FunctionL2Logs<EncryptedL2Log>;
pub type UnencryptedFunctionL2Logs = FunctionL2Logs<UnencryptedL2Log>;

// TESTS
// ================================================================================================
