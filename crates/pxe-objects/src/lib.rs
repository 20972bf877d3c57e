#![no_std]

#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod abi;
pub mod address;
pub mod block;
pub mod fields;
pub mod hash;
pub mod logs;
pub mod note;
pub mod transaction;
pub mod witness;

mod constants;
mod errors;

// RE-EXPORTS
// ================================================================================================

pub use constants::*;
pub use errors::{AbiError, FieldDecodingError, NoteError};
pub use miden_crypto::hash::rpo::{Rpo256 as Hasher, RpoDigest as Digest};
pub use miden_crypto::{EMPTY_WORD, Felt, FieldElement, ONE, StarkField, WORD_SIZE, Word, ZERO};

pub mod crypto {
    pub use miden_crypto::{merkle, rand};
}
