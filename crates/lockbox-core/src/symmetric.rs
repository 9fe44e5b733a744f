//! AES-256-CBC with PKCS#7 padding.
//!
//! This module provides:
//! - [`encrypt`]: pad and encrypt plaintext under a key and caller-chosen IV
//! - [`decrypt`]: decrypt and strip padding
//!
//! CBC gives confidentiality only. There is no authentication tag: a padding
//! failure is the only (weak) signal of tampering, and a modified ciphertext
//! whose last block still unpads cleanly decrypts to garbage without error.
//! Every decryption failure maps to `CryptoError::DecryptionFailed` so the
//! cause (bad IV length, wrong key, bad padding) cannot be told apart.

use crate::error::CryptoError;
use crate::key::KEY_LEN;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block length in bytes; also the only accepted IV length.
pub const BLOCK_LEN: usize = 16;

/// Encrypt `plaintext` with AES-256-CBC under `key` and `iv`.
///
/// The output is `plaintext.len()` rounded up to the next whole block
/// (always at least one byte of padding).
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` if the key is not 32 bytes or the IV
/// is not 16 bytes.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidInput(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    let cipher = Aes256CbcEnc::new_from_slices(key, iv).map_err(|_| {
        CryptoError::InvalidInput(format!(
            "invalid nonce length: {} bytes (expected {BLOCK_LEN})",
            iv.len()
        ))
    })?;
    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt AES-256-CBC ciphertext and remove PKCS#7 padding.
///
/// # Errors
///
/// Returns `CryptoError::DecryptionFailed` for any failure: key or IV of the
/// wrong length, ciphertext that is not a whole number of blocks, or invalid
/// padding (typically wrong key or tampered data).
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher =
        Aes256CbcDec::new_from_slices(key, iv).map_err(|_| CryptoError::DecryptionFailed)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
