//! Symmetric key material.
//!
//! A [`Key`] owns its bytes in a [`SecretBuffer`]. The bytes are only
//! reachable through the scoped accessor [`Key::with_bytes`], and are zeroed
//! exactly once: on [`Key::clear`] or when the `Key` is dropped, whichever
//! comes first.

use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use crate::protected::ProtectedStorage;
use std::fmt;
use zeroize::Zeroize;

/// Length of a generated key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Symmetric key used by [`crate::HashBox`] and [`crate::SecretLocker`].
pub struct Key {
    material: Option<SecretBuffer>,
}

impl Key {
    /// Generate a fresh random 32-byte key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn generate() -> Result<Self, CryptoError> {
        Ok(Self {
            material: Some(SecretBuffer::random(KEY_LEN)?),
        })
    }

    /// Build a key from caller-supplied bytes, used as-is.
    ///
    /// Any non-zero length is accepted here; the symmetric locker additionally
    /// requires [`KEY_LEN`] bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `bytes` is empty.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::InvalidInput("key can't be empty".into()));
        }
        Ok(Self {
            material: Some(SecretBuffer::new(bytes)),
        })
    }

    /// Import a key previously exported with [`Key::storable`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for an empty blob, and propagates
    /// backend errors (`PlatformUnsupported`, `ProtectedStorage`).
    pub fn from_storable(blob: &[u8], storage: &dyn ProtectedStorage) -> Result<Self, CryptoError> {
        if blob.is_empty() {
            return Err(CryptoError::InvalidInput("storable blob can't be empty".into()));
        }
        let mut raw = storage.unprotect(blob)?;
        let key = Self::from_bytes(&raw);
        raw.zeroize();
        key
    }

    /// Export the key through the protected-storage collaborator.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::PlatformUnsupported` where no service exists,
    /// `CryptoError::InvalidInput` if the key was cleared.
    pub fn storable(&self, storage: &dyn ProtectedStorage) -> Result<Vec<u8>, CryptoError> {
        self.with_bytes(|bytes| storage.protect(bytes))
    }

    /// Run `f` with the raw key bytes.
    ///
    /// The borrow cannot outlive the call, so no copy of the material escapes
    /// unless `f` makes one.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if the key was cleared, otherwise
    /// whatever `f` returns.
    pub fn with_bytes<R>(
        &self,
        f: impl FnOnce(&[u8]) -> Result<R, CryptoError>,
    ) -> Result<R, CryptoError> {
        let material = self
            .material
            .as_ref()
            .ok_or_else(|| CryptoError::InvalidInput("key has been cleared".into()))?;
        f(material.expose())
    }

    /// Key length in bytes, `0` once cleared.
    #[must_use]
    pub fn len(&self) -> usize {
        self.material.as_ref().map_or(0, SecretBuffer::len)
    }

    /// Returns `true` once the key has been cleared.
    #[must_use]
    pub const fn is_cleared(&self) -> bool {
        self.material.is_none()
    }

    /// Zero the key material. Idempotent.
    pub fn clear(&mut self) {
        if self.material.take().is_some() {
            tracing::trace!("key material cleared");
        }
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_cleared() {
            f.write_str("Key(cleared)")
        } else {
            f.write_str("Key(***)")
        }
    }
}
