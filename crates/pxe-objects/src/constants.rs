/// Side-effect counter value reserved for the transaction hash. The first side effect of a
/// transaction observable by user code carries `INITIAL_SIDE_EFFECT_COUNTER + 1`.
pub const INITIAL_SIDE_EFFECT_COUNTER: u32 = 1;

/// Number of field elements in an encoded call context.
pub const CALL_CONTEXT_LENGTH: usize = 6;

/// Number of field elements in an encoded transaction context.
pub const TX_CONTEXT_LENGTH: usize = 2;

/// Number of field elements in an encoded block header: block number, timestamp and five tree
/// roots of four elements each.
pub const BLOCK_HEADER_LENGTH: usize = 2 + 5 * 4;

/// Number of field elements in an encoded private call stack item.
pub const PRIVATE_CALL_STACK_ITEM_LENGTH: usize = 3 + CALL_CONTEXT_LENGTH + 5;

/// Number of field elements returned to the caller of an enqueued public function call.
pub const ENQUEUE_PUBLIC_FUNCTION_RESULT_LENGTH: usize = 2 + CALL_CONTEXT_LENGTH + 1;

/// Number of public keys associated with an address.
pub const NUM_PUBLIC_KEYS: usize = 4;

/// Number of bytes in an AES-128 key and initialization vector.
pub const AES128_KEY_SIZE: usize = 16;

/// Number of bytes in a field element's canonical big-endian encoding.
pub const FELT_BYTES: usize = 8;

// MANDATORY CONTRACT FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Name of the unconstrained function every note-holding contract must export.
pub const COMPUTE_NOTE_HASH_AND_NULLIFIER_NAME: &str = "compute_note_hash_and_nullifier";

/// Parameters of `compute_note_hash_and_nullifier`: contract address, nonce, storage slot, note
/// type id and the (padded) note items.
pub const COMPUTE_NOTE_HASH_AND_NULLIFIER_ARITY: usize = 5;

/// Outputs of `compute_note_hash_and_nullifier`: inner note hash, siloed note hash, unique
/// siloed note hash and inner nullifier.
pub const COMPUTE_NOTE_HASH_AND_NULLIFIER_RETURN_LENGTH: usize = 4;
