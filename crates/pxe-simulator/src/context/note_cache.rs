use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};

use pxe_objects::{
    Felt, StarkField, ZERO, address::Address, hash::silo_nullifier, note::NoteData,
};
use tracing::trace;

use crate::OracleError;

// NOTE CACHE
// ================================================================================================

/// Notes and nullifiers created during one transaction which are not yet committed.
///
/// Pending notes are kept per contract in creation order. Nullifiers are stored siloed, per
/// contract. A nullifier must consume exactly one note: either a pending note, identified by its
/// inner note hash, or a committed note which was read earlier in this transaction.
#[derive(Debug, Default, Clone)]
pub struct NoteCache {
    pending_notes: BTreeMap<Address, Vec<PendingNote>>,
    nullifiers: BTreeMap<Address, BTreeSet<u64>>,
    /// Siloed nullifiers of committed notes returned by note reads.
    settled_reads: BTreeMap<Address, BTreeSet<u64>>,
}

#[derive(Debug, Clone)]
struct PendingNote {
    note: NoteData,
    counter: u32,
}

impl NoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a note created at `counter`.
    pub fn add_new_note(&mut self, note: NoteData, counter: u32) {
        self.pending_notes
            .entry(note.contract_address)
            .or_default()
            .push(PendingNote { note, counter });
    }

    /// Returns the pending notes of a contract at `storage_slot` in creation order.
    pub fn get_notes(&self, contract_address: Address, storage_slot: Felt) -> Vec<NoteData> {
        self.pending_notes
            .get(&contract_address)
            .into_iter()
            .flatten()
            .filter(|pending| pending.note.storage_slot == storage_slot)
            .map(|pending| pending.note.clone())
            .collect()
    }

    /// Remembers that a committed note was returned to a function.
    pub fn record_settled_read(&mut self, note: &NoteData) {
        if let Some(nullifier) = note.siloed_nullifier {
            self.settled_reads
                .entry(note.contract_address)
                .or_default()
                .insert(nullifier.as_int());
        }
    }

    /// Returns true if the contract emitted `siloed_nullifier` in this transaction.
    pub fn contains_nullifier(&self, contract_address: Address, siloed_nullifier: Felt) -> bool {
        self.nullifiers
            .get(&contract_address)
            .is_some_and(|set| set.contains(&siloed_nullifier.as_int()))
    }

    /// Records the nullification of a note.
    ///
    /// A non-zero `inner_note_hash` identifies a pending note, which is removed from the cache;
    /// its creation counter is returned. A zero `inner_note_hash` refers to a committed note read
    /// earlier in the transaction.
    ///
    /// # Errors
    /// Returns an error if the nullifier was already emitted, or if the note it consumes is
    /// unknown.
    pub fn nullify_note(
        &mut self,
        contract_address: Address,
        inner_nullifier: Felt,
        inner_note_hash: Felt,
    ) -> Result<Option<u32>, OracleError> {
        let siloed_nullifier = silo_nullifier(contract_address, inner_nullifier);
        if self.contains_nullifier(contract_address, siloed_nullifier) {
            return Err(OracleError::NoteAlreadyNullified { contract: contract_address, inner_nullifier });
        }

        let note_hash_counter = if inner_note_hash != ZERO {
            let notes = self.pending_notes.get_mut(&contract_address);
            let position = notes.as_ref().and_then(|notes| {
                notes.iter().position(|pending| pending.note.inner_note_hash == inner_note_hash)
            });
            match (notes, position) {
                (Some(notes), Some(position)) => Some(notes.remove(position).counter),
                _ => {
                    return Err(OracleError::PendingNoteNotFound {
                        contract: contract_address,
                        inner_note_hash,
                    });
                },
            }
        } else {
            let was_read = self
                .settled_reads
                .get(&contract_address)
                .is_some_and(|set| set.contains(&siloed_nullifier.as_int()));
            if !was_read {
                return Err(OracleError::NullifiedNoteNotFound {
                    contract: contract_address,
                    inner_nullifier,
                });
            }
            None
        };

        trace!(target: "pxe::note_cache", contract = %contract_address, ?note_hash_counter, "note nullified");
        self.nullifiers
            .entry(contract_address)
            .or_default()
            .insert(siloed_nullifier.as_int());
        Ok(note_hash_counter)
    }
}

// TESTS
// ================================================================================================
