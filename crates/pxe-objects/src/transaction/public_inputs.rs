use alloc::vec::Vec;

use super::{CallContext, TxContext};
use crate::{
    Felt,
    block::BlockHeader,
    hash::{hash_with_separator, separator},
};

// SIDE EFFECTS
// ================================================================================================

/// A value emitted by a function together with the counter at which it was emitted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SideEffect {
    pub value: Felt,
    pub counter: u32,
}

impl SideEffect {
    pub const fn new(value: Felt, counter: u32) -> Self {
        Self { value, counter }
    }

    fn to_fields(self) -> [Felt; 2] {
        [self.value, Felt::new(self.counter as u64)]
    }
}

/// A nullifier together with the note hash it consumes, if the note was created in the same
/// transaction.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SideEffectLinkedToNoteHash {
    pub value: Felt,
    pub note_hash: Felt,
    pub counter: u32,
}

impl SideEffectLinkedToNoteHash {
    fn to_fields(self) -> [Felt; 3] {
        [self.value, self.note_hash, Felt::new(self.counter as u64)]
    }
}

/// A request to prove that a value exists in a tree at the historical header.
pub type ReadRequest = SideEffect;

/// A message sent from a private function to the settlement layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct L2ToL1Message {
    pub recipient: Felt,
    pub content: Felt,
}

// PRIVATE CIRCUIT PUBLIC INPUTS
// ================================================================================================

/// The public inputs a private function exposes to the private kernel.
///
/// The fixed-size layout the circuits use is produced by the prover. This container holds only
/// the populated entries and commits to them via [`Self::hash`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PrivateCircuitPublicInputs {
    pub call_context: CallContext,
    pub args_hash: Felt,
    pub returns_hash: Felt,
    pub note_hash_read_requests: Vec<ReadRequest>,
    pub new_note_hashes: Vec<SideEffect>,
    pub new_nullifiers: Vec<SideEffectLinkedToNoteHash>,
    pub private_call_stack_hashes: Vec<Felt>,
    pub public_call_stack_hashes: Vec<Felt>,
    pub new_l2_to_l1_msgs: Vec<L2ToL1Message>,
    pub start_side_effect_counter: u32,
    pub end_side_effect_counter: u32,
    pub encrypted_logs_hashes: Vec<SideEffect>,
    pub unencrypted_logs_hashes: Vec<SideEffect>,
    pub encrypted_log_preimages_length: u64,
    pub unencrypted_log_preimages_length: u64,
    pub historical_header: BlockHeader,
    pub tx_context: TxContext,
}

impl PrivateCircuitPublicInputs {
    /// Returns true if the function produced any state change or log.
    pub fn has_side_effects(&self) -> bool {
        !self.new_note_hashes.is_empty()
            || !self.new_nullifiers.is_empty()
            || !self.new_l2_to_l1_msgs.is_empty()
            || !self.encrypted_logs_hashes.is_empty()
            || !self.unencrypted_logs_hashes.is_empty()
    }

    pub fn to_fields(&self) -> Vec<Felt> {
        let mut fields = self.call_context.to_fields();
        fields.push(self.args_hash);
        fields.push(self.returns_hash);

        // variable-length sections are prefixed with their length
        push_section(&mut fields, &self.note_hash_read_requests, |e| e.to_fields().to_vec());
        push_section(&mut fields, &self.new_note_hashes, |e| e.to_fields().to_vec());
        push_section(&mut fields, &self.new_nullifiers, |e| e.to_fields().to_vec());
        push_section(&mut fields, &self.private_call_stack_hashes, |h| vec![*h]);
        push_section(&mut fields, &self.public_call_stack_hashes, |h| vec![*h]);
        push_section(&mut fields, &self.new_l2_to_l1_msgs, |m| vec![m.recipient, m.content]);

        fields.push(Felt::new(self.start_side_effect_counter as u64));
        fields.push(Felt::new(self.end_side_effect_counter as u64));

        push_section(&mut fields, &self.encrypted_logs_hashes, |e| e.to_fields().to_vec());
        push_section(&mut fields, &self.unencrypted_logs_hashes, |e| e.to_fields().to_vec());
        fields.push(Felt::new(self.encrypted_log_preimages_length));
        fields.push(Felt::new(self.unencrypted_log_preimages_length));

        fields.extend(self.historical_header.to_fields());
        fields.extend(self.tx_context.to_fields());
        fields
    }

    pub fn hash(&self) -> Felt {
        hash_with_separator(separator::PRIVATE_PUBLIC_INPUTS, &self.to_fields())
    }
}

fn push_section<T>(fields: &mut Vec<Felt>, items: &[T], encode: impl Fn(&T) -> Vec<Felt>) {
    fields.push(Felt::new(items.len() as u64));
    for item in items {
        fields.extend(encode(item));
    }
}
