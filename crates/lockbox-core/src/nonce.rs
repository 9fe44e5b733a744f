//! Initialization vectors.

use crate::error::CryptoError;
use crate::random::random_bytes;
use serde::{Deserialize, Serialize};

/// Default nonce length in bytes (one AES block).
pub const NONCE_LEN: usize = 16;

/// IV/nonce bytes. Never reuse one with the same key for encryption.
///
/// Any length can be represented; whether it is usable is decided by the
/// cipher at decryption time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nonce(Vec<u8>);

impl Nonce {
    /// Generate a random [`NONCE_LEN`]-byte nonce.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn generate() -> Result<Self, CryptoError> {
        Self::with_len(NONCE_LEN)
    }

    /// Generate a random nonce of `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `len` is zero.
    pub fn with_len(len: usize) -> Result<Self, CryptoError> {
        random_bytes(len).map(Self)
    }

    /// Wrap explicit bytes, e.g. parsed from a combined blob.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Nonce {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
