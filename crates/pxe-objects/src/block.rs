use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter};

use crate::{
    BLOCK_HEADER_LENGTH, Digest, Felt, FieldDecodingError, StarkField,
    fields::FieldReader,
    hash::{hash_with_separator, separator},
};

// BLOCK HEADER
// ================================================================================================

/// The header of a block, committing to the state of every tree at the end of that block.
///
/// Private functions execute against a historical header: every membership witness they consume
/// must be anchored to one of the roots below.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    block_number: u32,
    timestamp: u64,
    note_hash_tree_root: Digest,
    nullifier_tree_root: Digest,
    public_data_tree_root: Digest,
    l1_to_l2_message_tree_root: Digest,
    archive_root: Digest,
}

impl BlockHeader {
    pub fn new(
        block_number: u32,
        timestamp: u64,
        note_hash_tree_root: Digest,
        nullifier_tree_root: Digest,
        public_data_tree_root: Digest,
        l1_to_l2_message_tree_root: Digest,
        archive_root: Digest,
    ) -> Self {
        Self {
            block_number,
            timestamp,
            note_hash_tree_root,
            nullifier_tree_root,
            public_data_tree_root,
            l1_to_l2_message_tree_root,
            archive_root,
        }
    }

    /// Returns an otherwise empty header for the given block number.
    pub fn empty(block_number: u32) -> Self {
        Self { block_number, ..Default::default() }
    }

    // ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub fn block_number(&self) -> u32 {
        self.block_number
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn note_hash_tree_root(&self) -> Digest {
        self.note_hash_tree_root
    }

    pub fn nullifier_tree_root(&self) -> Digest {
        self.nullifier_tree_root
    }

    pub fn public_data_tree_root(&self) -> Digest {
        self.public_data_tree_root
    }

    pub fn l1_to_l2_message_tree_root(&self) -> Digest {
        self.l1_to_l2_message_tree_root
    }

    pub fn archive_root(&self) -> Digest {
        self.archive_root
    }

    /// Returns a commitment to all fields of this header.
    pub fn hash(&self) -> Felt {
        hash_with_separator(separator::BLOCK_HEADER, &self.to_fields())
    }

    // ENCODING
    // --------------------------------------------------------------------------------------------

    pub fn to_fields(&self) -> Vec<Felt> {
        let mut fields = Vec::with_capacity(BLOCK_HEADER_LENGTH);
        fields.push(Felt::new(self.block_number as u64));
        fields.push(Felt::new(self.timestamp));
        for root in [
            self.note_hash_tree_root,
            self.nullifier_tree_root,
            self.public_data_tree_root,
            self.l1_to_l2_message_tree_root,
            self.archive_root,
        ] {
            fields.extend_from_slice(root.as_elements());
        }
        fields
    }

    pub fn read_from(reader: &mut FieldReader<'_>) -> Result<Self, FieldDecodingError> {
        Ok(Self {
            block_number: reader.read_u32()?,
            timestamp: reader.read_u64()?,
            note_hash_tree_root: reader.read_digest()?,
            nullifier_tree_root: reader.read_digest()?,
            public_data_tree_root: reader.read_digest()?,
            l1_to_l2_message_tree_root: reader.read_digest()?,
            archive_root: reader.read_digest()?,
        })
    }
}

// MERKLE TREE ID
// ================================================================================================

/// The trees a private function may request witnesses for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum MerkleTreeId {
    NullifierTree = 0,
    NoteHashTree = 1,
    PublicDataTree = 2,
    L1ToL2MessageTree = 3,
    Archive = 4,
}

impl TryFrom<Felt> for MerkleTreeId {
    type Error = FieldDecodingError;

    fn try_from(value: Felt) -> Result<Self, Self::Error> {
        match value.as_int() {
            0 => Ok(Self::NullifierTree),
            1 => Ok(Self::NoteHashTree),
            2 => Ok(Self::PublicDataTree),
            3 => Ok(Self::L1ToL2MessageTree),
            4 => Ok(Self::Archive),
            value => Err(FieldDecodingError::InvalidDiscriminant { kind: "merkle tree id", value }),
        }
    }
}

impl Display for MerkleTreeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullifierTree => f.write_str("nullifier tree"),
            Self::NoteHashTree => f.write_str("note hash tree"),
            Self::PublicDataTree => f.write_str("public data tree"),
            Self::L1ToL2MessageTree => f.write_str("L1 to L2 message tree"),
            Self::Archive => f.write_str("archive"),
        }
    }
}

// TESTS
// ================================================================================================
