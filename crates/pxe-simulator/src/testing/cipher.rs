use alloc::vec::Vec;

use pxe_objects::AES128_KEY_SIZE;

use crate::SymmetricCipher;

/// A [SymmetricCipher] with AES-CBC framing but a XOR block function.
///
/// Produces output of the right shape (PKCS#7 padded, chained blocks) without pulling a block
/// cipher into tests. Not secure.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockCipher;

impl SymmetricCipher for MockCipher {
    fn encrypt_cbc(
        &self,
        plaintext: &[u8],
        iv: &[u8; AES128_KEY_SIZE],
        key: &[u8; AES128_KEY_SIZE],
    ) -> Vec<u8> {
        let padding = AES128_KEY_SIZE - plaintext.len() % AES128_KEY_SIZE;
        let mut padded = plaintext.to_vec();
        padded.resize(plaintext.len() + padding, padding as u8);

        let mut previous = *iv;
        let mut ciphertext = Vec::with_capacity(padded.len());
        for block in padded.chunks_exact(AES128_KEY_SIZE) {
            for (i, byte) in block.iter().enumerate() {
                previous[i] = byte ^ previous[i] ^ key[i];
            }
            ciphertext.extend_from_slice(&previous);
        }
        ciphertext
    }
}
