//! Plaintext passwords and their stored verifiers.

use crate::encoding::key_decode;
use crate::error::CryptoError;
use crate::kdf::{self, Pbkdf2Params};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A plaintext password, zeroized on drop.
pub struct Password {
    plaintext: SecretString,
    params: Pbkdf2Params,
}

impl Password {
    /// Password hashed with the default [`Pbkdf2Params`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for an empty password.
    pub fn new(plaintext: impl Into<String>) -> Result<Self, CryptoError> {
        Self::with_params(plaintext, Pbkdf2Params::default())
    }

    /// Password hashed with `iterations` PBKDF2 rounds.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for an empty password or a zero
    /// iteration count.
    pub fn with_iterations(
        plaintext: impl Into<String>,
        iterations: u32,
    ) -> Result<Self, CryptoError> {
        Self::with_params(plaintext, Pbkdf2Params::new(iterations)?)
    }

    /// Password hashed and verified with explicit params.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for an empty password or invalid
    /// params.
    pub fn with_params(
        plaintext: impl Into<String>,
        params: Pbkdf2Params,
    ) -> Result<Self, CryptoError> {
        let plaintext: String = plaintext.into();
        if plaintext.is_empty() {
            return Err(CryptoError::InvalidInput("password can't be empty".into()));
        }
        params.validate()?;
        Ok(Self {
            plaintext: SecretString::from(plaintext),
            params,
        })
    }

    #[must_use]
    pub const fn params(&self) -> &Pbkdf2Params {
        &self.params
    }

    /// Hash into a form that can be stored and verified later.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if salt generation fails.
    pub fn storable(&self) -> Result<SecuredPassword, CryptoError> {
        let hash = kdf::hash_encoded(self.plaintext.expose_secret(), &self.params)?;
        Ok(SecuredPassword { hash })
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Stored, verifiable PBKDF2 hash of a password (Base64 text).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecuredPassword {
    hash: String,
}

impl SecuredPassword {
    /// Wrap a stored hash.
    ///
    /// The content is not validated here; a malformed hash simply never
    /// verifies.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for empty text.
    pub fn new(hash: impl Into<String>) -> Result<Self, CryptoError> {
        let hash: String = hash.into();
        if hash.is_empty() {
            return Err(CryptoError::InvalidInput("stored hash can't be empty".into()));
        }
        Ok(Self { hash })
    }

    /// Base64 text to store.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Iteration count embedded in the hash, if it is well formed.
    #[must_use]
    pub fn iterations(&self) -> Option<u32> {
        let blob = key_decode(&self.hash).ok()?;
        if blob.len() != kdf::BLOB_LEN {
            return None;
        }
        kdf::embedded_iterations(&blob).map(std::num::NonZeroU32::get)
    }

    /// Returns `true` if the hash should be regenerated under `params`:
    /// it is malformed or was made with fewer iterations.
    #[must_use]
    pub fn needs_rehash(&self, params: &Pbkdf2Params) -> bool {
        self.iterations().is_none_or(|n| n < params.iterations)
    }

    /// Check `password` against this hash.
    ///
    /// The iteration count embedded in the hash is used; `password`'s
    /// `max_iterations` bounds it.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encoding` if the stored text is not Base64.
    pub fn verify(&self, password: &Password) -> Result<bool, CryptoError> {
        kdf::verify(
            password.plaintext.expose_secret(),
            &self.hash,
            &password.params,
        )
    }
}

impl TryFrom<String> for SecuredPassword {
    type Error = CryptoError;

    fn try_from(hash: String) -> Result<Self, Self::Error> {
        Self::new(hash)
    }
}

impl From<SecuredPassword> for String {
    fn from(secured: SecuredPassword) -> Self {
        secured.hash
    }
}

impl fmt::Display for SecuredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hash)
    }
}
