use alloc::vec::Vec;

use crate::{Felt, FieldDecodingError, StarkField, address::Address};

mod selection;
pub use selection::{
    Comparator, NoteFilter, PropertySelector, Select, Sort, SortOrder, pick_notes,
};

// NOTE
// ================================================================================================

/// The content of a note: an ordered sequence of field elements whose meaning is defined by the
/// contract which owns the note.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Note {
    items: Vec<Felt>,
}

impl Note {
    pub fn new(items: Vec<Felt>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Felt] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<Felt>> for Note {
    fn from(items: Vec<Felt>) -> Self {
        Self::new(items)
    }
}

// NOTE DATA
// ================================================================================================

/// Information about a note needed while executing a function that reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteData {
    pub note: Note,
    pub contract_address: Address,
    pub storage_slot: Felt,
    pub nonce: Felt,
    pub inner_note_hash: Felt,
    /// Nullifier of the note siloed to its contract. `None` for pending notes.
    pub siloed_nullifier: Option<Felt>,
    /// Leaf index of the note in the note hash tree. `None` for pending notes.
    pub index: Option<u64>,
}

impl NoteData {
    /// Returns true if the note was created in the current transaction and has not been
    /// committed to the note hash tree yet.
    pub fn is_pending(&self) -> bool {
        self.index.is_none()
    }
}

/// A note created by a function, together with where it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteAndSlot {
    pub note: Note,
    pub storage_slot: Felt,
    pub note_type_id: Felt,
    /// Side-effect counter at which the note was created.
    pub counter: u32,
}

/// Links the creation of a pending note to its nullification within the same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullifiedNoteHashCounter {
    pub note_hash_counter: u32,
    pub nullifier_counter: u32,
}

// NOTE STATUS
// ================================================================================================

/// Which committed notes a read should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStatus {
    /// Only notes which have not been nullified.
    Active = 1,
    /// Active notes and notes whose nullifier is already in the nullifier tree.
    ActiveOrNullified = 2,
}

impl TryFrom<Felt> for NoteStatus {
    type Error = FieldDecodingError;

    fn try_from(value: Felt) -> Result<Self, Self::Error> {
        match value.as_int() {
            1 => Ok(Self::Active),
            2 => Ok(Self::ActiveOrNullified),
            value => Err(FieldDecodingError::InvalidDiscriminant { kind: "note status", value }),
        }
    }
}
