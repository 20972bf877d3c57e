//! Domain-separated hashing used to derive protocol values.
//!
//! All wire values are single field elements, so each derivation hashes its inputs together with
//! a domain separator and keeps the first element of the resulting digest.

use alloc::vec::Vec;

use crate::{Felt, Hasher, ZERO, address::Address};

// DOMAIN SEPARATORS
// ================================================================================================

pub mod separator {
    pub const NOTE_HASH_NONCE: u64 = 2;
    pub const SILOED_NOTE_HASH: u64 = 3;
    pub const UNIQUE_NOTE_HASH: u64 = 4;
    pub const CALL_STACK_ITEM: u64 = 5;
    pub const OUTER_NULLIFIER: u64 = 7;
    pub const PUBLIC_LEAF_INDEX: u64 = 23;
    pub const FUNCTION_ARGS: u64 = 26;
    pub const ENCRYPTED_LOG: u64 = 40;
    pub const UNENCRYPTED_LOG: u64 = 41;
    pub const PRIVATE_PUBLIC_INPUTS: u64 = 42;
    pub const BLOCK_HEADER: u64 = 43;
}

/// Hashes `elements` prefixed with a domain `separator` and returns the first digest element.
pub fn hash_with_separator(separator: u64, elements: &[Felt]) -> Felt {
    let mut input = Vec::with_capacity(elements.len() + 1);
    input.push(Felt::new(separator));
    input.extend_from_slice(elements);
    Hasher::hash_elements(&input).as_elements()[0]
}

// NOTE HASHES
// ================================================================================================

/// Scopes an inner note hash to the contract which created it.
pub fn silo_note_hash(contract_address: Address, inner_note_hash: Felt) -> Felt {
    hash_with_separator(
        separator::SILOED_NOTE_HASH,
        &[contract_address.as_felt(), inner_note_hash],
    )
}

/// Makes a siloed note hash unique by binding it to the nonce assigned at insertion.
pub fn compute_unique_note_hash(nonce: Felt, siloed_note_hash: Felt) -> Felt {
    hash_with_separator(separator::UNIQUE_NOTE_HASH, &[nonce, siloed_note_hash])
}

/// Derives the nonce of the `index`-th note hash of a transaction.
pub fn compute_note_hash_nonce(first_nullifier: Felt, index: u64) -> Felt {
    hash_with_separator(separator::NOTE_HASH_NONCE, &[first_nullifier, Felt::new(index)])
}

// NULLIFIERS
// ================================================================================================

/// Scopes an inner nullifier to the contract which emitted it.
pub fn silo_nullifier(contract_address: Address, inner_nullifier: Felt) -> Felt {
    hash_with_separator(
        separator::OUTER_NULLIFIER,
        &[contract_address.as_felt(), inner_nullifier],
    )
}

// PUBLIC DATA
// ================================================================================================

/// Computes the leaf slot of a contract's public storage slot in the public data tree.
pub fn compute_public_data_tree_index(contract_address: Address, storage_slot: Felt) -> Felt {
    hash_with_separator(
        separator::PUBLIC_LEAF_INDEX,
        &[contract_address.as_felt(), storage_slot],
    )
}

// ARGUMENTS
// ================================================================================================

/// Hashes a variable-length list of arguments. The empty list hashes to zero.
pub fn compute_var_args_hash(args: &[Felt]) -> Felt {
    if args.is_empty() {
        return ZERO;
    }
    hash_with_separator(separator::FUNCTION_ARGS, args)
}

// TESTS
// ================================================================================================
