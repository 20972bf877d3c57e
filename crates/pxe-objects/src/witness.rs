//! Merkle witnesses handed to private functions.
//!
//! Tree nodes are digests; on the wire every node of a sibling path is flattened into its four
//! elements, leaf to root.

use alloc::vec::Vec;

use miden_crypto::merkle::MerklePath;

use crate::{Felt, ZERO};

/// Flattens the nodes of `path` into field elements.
pub fn path_to_fields(path: &MerklePath) -> Vec<Felt> {
    path.iter().flat_map(|node| node.as_elements().iter().copied()).collect()
}

// NULLIFIER TREE
// ================================================================================================

/// A leaf of the indexed nullifier tree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NullifierLeafPreimage {
    pub nullifier: Felt,
    pub next_nullifier: Felt,
    pub next_index: u64,
}

/// Proof that a nullifier (or, for non-membership, its low leaf) is in the nullifier tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullifierMembershipWitness {
    pub index: u64,
    pub leaf_preimage: NullifierLeafPreimage,
    pub sibling_path: MerklePath,
}

impl NullifierMembershipWitness {
    /// Layout: `[index, nullifier, next_nullifier, next_index, path...]`.
    pub fn to_fields(&self) -> Vec<Felt> {
        let mut fields = vec![
            Felt::new(self.index),
            self.leaf_preimage.nullifier,
            self.leaf_preimage.next_nullifier,
            Felt::new(self.leaf_preimage.next_index),
        ];
        fields.extend(path_to_fields(&self.sibling_path));
        fields
    }
}

// PUBLIC DATA TREE
// ================================================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PublicDataTreeLeafPreimage {
    pub slot: Felt,
    pub value: Felt,
    pub next_slot: Felt,
    pub next_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicDataWitness {
    pub index: u64,
    pub leaf_preimage: PublicDataTreeLeafPreimage,
    pub sibling_path: MerklePath,
}

impl PublicDataWitness {
    /// Layout: `[index, slot, value, next_index, next_slot, path...]`.
    pub fn to_fields(&self) -> Vec<Felt> {
        let mut fields = vec![
            Felt::new(self.index),
            self.leaf_preimage.slot,
            self.leaf_preimage.value,
            Felt::new(self.leaf_preimage.next_index),
            self.leaf_preimage.next_slot,
        ];
        fields.extend(path_to_fields(&self.sibling_path));
        fields
    }
}

// MESSAGES
// ================================================================================================

/// Inclusion proof of an L1 to L2 message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageLoadOracleInputs {
    pub index: u64,
    pub sibling_path: MerklePath,
}

impl MessageLoadOracleInputs {
    pub fn to_fields(&self) -> Vec<Felt> {
        let mut fields = vec![Felt::new(self.index)];
        fields.extend(path_to_fields(&self.sibling_path));
        fields
    }
}

// NOTE HASH READ REQUESTS
// ================================================================================================

/// Partial witness for a note hash read request.
///
/// Reads of settled notes are proven against the note hash tree at `leaf_index`; the sibling
/// path is filled in by the kernel prover. Reads of pending notes are matched against note
/// hashes of the same transaction and carry no tree position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHashReadRequestMembershipWitness {
    pub leaf_index: Felt,
    pub is_transient: bool,
    pub sibling_path: MerklePath,
}

impl NoteHashReadRequestMembershipWitness {
    pub fn settled(leaf_index: u64) -> Self {
        Self {
            leaf_index: Felt::new(leaf_index),
            is_transient: false,
            sibling_path: MerklePath::new(Vec::new()),
        }
    }

    pub fn transient() -> Self {
        Self {
            leaf_index: ZERO,
            is_transient: true,
            sibling_path: MerklePath::new(Vec::new()),
        }
    }
}

// TESTS
// ================================================================================================
