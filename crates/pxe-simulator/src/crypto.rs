use alloc::vec::Vec;

use pxe_objects::AES128_KEY_SIZE;

/// AES-128 in CBC mode, used by contracts to encrypt note logs.
pub trait SymmetricCipher: Send + Sync {
    /// Encrypts `plaintext` with PKCS#7 padding.
    fn encrypt_cbc(
        &self,
        plaintext: &[u8],
        iv: &[u8; AES128_KEY_SIZE],
        key: &[u8; AES128_KEY_SIZE],
    ) -> Vec<u8>;
}
