//! Secret locker: symmetric lock/unlock of byte and string payloads.
//!
//! - [`SecretLocker`]: owns a [`Key`] and encrypts every payload under a
//!   fresh random [`Nonce`]
//! - [`Locked`]: ciphertext + nonce, with a single-blob "combined" form
//!
//! # Combined wire format
//!
//! ```text
//! nonce_len (i32 LE, 4 bytes) || nonce (nonce_len bytes) || ciphertext (rest)
//! ```
//!
//! There is no authentication tag and no ciphertext length field. Parsing a
//! truncated blob fails with `CryptoError::Format`; a blob whose ciphertext
//! was altered parses fine and is only caught (sometimes) at unlock time.

use crate::encoding::{decode, encode, key_decode, key_encode};
use crate::error::CryptoError;
use crate::key::Key;
use crate::nonce::Nonce;
use crate::symmetric;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Size of the nonce length prefix in the combined format.
const LEN_PREFIX: usize = 4;

// ---------------------------------------------------------------------------
// Locked
// ---------------------------------------------------------------------------

/// Ciphertext bundled with the nonce used to produce it.
#[must_use = "locked data must be stored or transmitted"]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locked {
    ciphertext: Vec<u8>,
    nonce: Nonce,
}

impl Locked {
    /// Pair a ciphertext with its nonce.
    pub const fn new(ciphertext: Vec<u8>, nonce: Nonce) -> Self {
        Self { ciphertext, nonce }
    }

    #[must_use]
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    #[must_use]
    pub const fn nonce(&self) -> &Nonce {
        &self.nonce
    }

    /// Serialize to the combined format.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if the nonce is longer than
    /// `i32::MAX` bytes and cannot be described by the length prefix.
    pub fn combined(&self) -> Result<Vec<u8>, CryptoError> {
        let nonce_len = i32::try_from(self.nonce.len()).map_err(|_| {
            CryptoError::InvalidInput(format!("nonce too long: {} bytes", self.nonce.len()))
        })?;
        let capacity = LEN_PREFIX
            .saturating_add(self.nonce.len())
            .saturating_add(self.ciphertext.len());
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&nonce_len.to_le_bytes());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        Ok(out)
    }

    /// Parse the combined format.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Format` if the blob is shorter than its length
    /// prefix, declares a negative nonce length, or ends inside the nonce.
    pub fn from_combined(bytes: &[u8]) -> Result<Self, CryptoError> {
        let (prefix, rest) = bytes.split_at_checked(LEN_PREFIX).ok_or_else(|| {
            CryptoError::Format(format!(
                "blob too short: {} bytes (minimum {LEN_PREFIX})",
                bytes.len()
            ))
        })?;

        let mut len_bytes = [0u8; LEN_PREFIX];
        len_bytes.copy_from_slice(prefix);
        let declared = i32::from_le_bytes(len_bytes);
        let nonce_len = usize::try_from(declared)
            .map_err(|_| CryptoError::Format(format!("negative nonce length: {declared}")))?;

        let (nonce, ciphertext) = rest.split_at_checked(nonce_len).ok_or_else(|| {
            CryptoError::Format(format!(
                "nonce truncated: declared {nonce_len} bytes, {} available",
                rest.len()
            ))
        })?;

        Ok(Self {
            ciphertext: ciphertext.to_vec(),
            nonce: Nonce::from_bytes(nonce),
        })
    }

    /// Base64 text of the combined format.
    ///
    /// # Errors
    ///
    /// Same as [`Locked::combined`].
    pub fn encoded(&self) -> Result<String, CryptoError> {
        self.combined().map(|blob| key_encode(&blob))
    }

    /// Parse Base64 text produced by [`Locked::encoded`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for empty text,
    /// `CryptoError::Encoding` for malformed Base64, or `CryptoError::Format`.
    pub fn from_encoded(text: &str) -> Result<Self, CryptoError> {
        if text.is_empty() {
            return Err(CryptoError::InvalidInput("locked text can't be empty".into()));
        }
        Self::from_combined(&key_decode(text)?)
    }
}

// ---------------------------------------------------------------------------
// SecretLocker
// ---------------------------------------------------------------------------

/// Locks (encrypts) and unlocks (decrypts) payloads with AES-256-CBC.
///
/// This provides confidentiality only. Tampered ciphertext is not reliably
/// detected; pair with a keyed [`crate::HashBox`] tag when integrity matters.
#[derive(Debug)]
pub struct SecretLocker {
    key: Key,
}

impl SecretLocker {
    /// Locker owning `key`. Locking requires a 32-byte key.
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self { key }
    }

    /// Locker with a freshly generated 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn with_generated_key() -> Result<Self, CryptoError> {
        Ok(Self::new(Key::generate()?))
    }

    #[must_use]
    pub const fn key(&self) -> &Key {
        &self.key
    }

    /// Encrypt `data` under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EmptyPayload` for empty data, or
    /// `CryptoError::InvalidInput` if the key is cleared or not 32 bytes.
    pub fn lock(&self, data: &[u8]) -> Result<Locked, CryptoError> {
        if data.is_empty() {
            return Err(CryptoError::EmptyPayload("data"));
        }
        let nonce = Nonce::generate()?;
        let ciphertext = self
            .key
            .with_bytes(|key| symmetric::encrypt(data, key, nonce.as_bytes()))?;
        tracing::debug!(
            plaintext_len = data.len(),
            ciphertext_len = ciphertext.len(),
            "payload locked"
        );
        Ok(Locked::new(ciphertext, nonce))
    }

    /// Encrypt UTF-8 text under a fresh random nonce.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for empty text; otherwise as
    /// [`SecretLocker::lock`].
    pub fn lock_str(&self, text: &str) -> Result<Locked, CryptoError> {
        let mut data = encode(text)?;
        let locked = self.lock(&data);
        data.zeroize();
        locked
    }

    /// Decrypt to bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::DecryptionFailed` for a nonce of invalid length,
    /// the wrong key, or damaged ciphertext/padding. Returns
    /// `CryptoError::InvalidInput` if this locker's key was cleared.
    pub fn unlock_bytes(&self, locked: &Locked) -> Result<Vec<u8>, CryptoError> {
        let result = self.key.with_bytes(|key| {
            symmetric::decrypt(locked.ciphertext(), key, locked.nonce().as_bytes())
        });
        match &result {
            Ok(plaintext) => tracing::debug!(plaintext_len = plaintext.len(), "payload unlocked"),
            Err(CryptoError::DecryptionFailed) => tracing::debug!("unlock failed"),
            Err(_) => {}
        }
        result
    }

    /// Decrypt to UTF-8 text.
    ///
    /// # Errors
    ///
    /// As [`SecretLocker::unlock_bytes`]; plaintext that is not valid UTF-8
    /// also yields `CryptoError::DecryptionFailed`, since it can only come
    /// from a wrong key or damaged ciphertext.
    pub fn unlock_str(&self, locked: &Locked) -> Result<String, CryptoError> {
        let plaintext = self.unlock_bytes(locked)?;
        decode(plaintext).map_err(|_| CryptoError::DecryptionFailed)
    }

    /// Zero this locker's key. Subsequent calls fail with `InvalidInput`.
    pub fn clear(&mut self) {
        self.key.clear();
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
