//! PBKDF2 password hashing with a self-describing stored format.
//!
//! This module provides:
//! - [`hash`] / [`hash_encoded`]: salt, derive and pack a verifiable blob
//! - [`verify`] / [`verify_blob`]: re-derive with the embedded parameters
//!   and compare in constant time
//! - [`Pbkdf2Params`]: serializable iteration settings
//!
//! # Stored format
//!
//! ```text
//! iterations (i32 LE, 4 bytes) || salt (32 bytes) || PBKDF2-HMAC-SHA1 (20 bytes)
//! ```
//!
//! The blob is stored as Base64 text. The iteration count travels with the
//! hash, so raising [`Pbkdf2Params::iterations`] later does not invalidate
//! old hashes.
//!
//! # Trust boundary
//!
//! Verification runs as many iterations as the stored blob asks for. If
//! stored hashes can come from an untrusted source, set
//! [`Pbkdf2Params::max_iterations`]; blobs above the cap are rejected as a
//! mismatch without deriving anything.

use crate::encoding::{constant_time_eq, key_decode, key_encode};
use crate::error::CryptoError;
use crate::random::fill_random;
use ring::pbkdf2;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use zeroize::Zeroize;

/// Salt length in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Derived key length in bytes (160 bits, the SHA-1 output size).
pub const HASH_LEN: usize = 20;

/// Length of the iteration-count prefix.
const ITERATIONS_LEN: usize = 4;

/// Total stored blob length: 4 + 32 + 20 = 56 bytes.
pub const BLOB_LEN: usize = ITERATIONS_LEN + SALT_LEN + HASH_LEN;

/// Default iteration count.
pub const DEFAULT_ITERATIONS: u32 = 500_000;

/// Largest count the signed 32-bit prefix can carry.
const MAX_ENCODABLE_ITERATIONS: u32 = i32::MAX as u32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// PBKDF2 settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pbkdf2Params {
    /// Iterations used for new hashes.
    pub iterations: u32,
    /// Upper bound accepted from stored blobs during verification.
    /// `None` accepts any embedded count.
    #[serde(default)]
    pub max_iterations: Option<u32>,
}

impl Default for Pbkdf2Params {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            max_iterations: None,
        }
    }
}

impl Pbkdf2Params {
    /// Params hashing with `iterations` and no verification cap.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `iterations` is zero or does not
    /// fit the signed 32-bit prefix.
    pub fn new(iterations: u32) -> Result<Self, CryptoError> {
        let params = Self {
            iterations,
            max_iterations: None,
        };
        params.validate()?;
        Ok(params)
    }

    /// Cap the iteration count accepted from stored blobs.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` if `max` is below `iterations`.
    pub fn with_max_iterations(self, max: u32) -> Result<Self, CryptoError> {
        let params = Self {
            max_iterations: Some(max),
            ..self
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the invariants of these params.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` describing the first violation.
    pub fn validate(&self) -> Result<(), CryptoError> {
        if self.iterations == 0 {
            return Err(CryptoError::InvalidInput(
                "number of iterations must be greater than zero".into(),
            ));
        }
        if self.iterations > MAX_ENCODABLE_ITERATIONS {
            return Err(CryptoError::InvalidInput(format!(
                "number of iterations exceeds {MAX_ENCODABLE_ITERATIONS}"
            )));
        }
        if let Some(max) = self.max_iterations {
            if max < self.iterations {
                return Err(CryptoError::InvalidInput(format!(
                    "max_iterations ({max}) is below iterations ({})",
                    self.iterations
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive a 20-byte PBKDF2-HMAC-SHA1 key.
#[must_use]
pub fn derive(password: &[u8], salt: &[u8], iterations: NonZeroU32) -> [u8; HASH_LEN] {
    let mut out = [0u8; HASH_LEN];
    pbkdf2::derive(pbkdf2::PBKDF2_HMAC_SHA1, iterations, salt, password, &mut out);
    out
}

/// Hash `password` with a fresh random salt into a [`BLOB_LEN`]-byte blob.
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` for an empty password or invalid
/// params, `CryptoError::Random` if salt generation fails.
pub fn hash(password: &str, params: &Pbkdf2Params) -> Result<[u8; BLOB_LEN], CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::InvalidInput("password can't be empty".into()));
    }
    params.validate()?;
    let iterations = NonZeroU32::new(params.iterations).ok_or_else(|| {
        CryptoError::InvalidInput("iteration count must be non-zero".into())
    })?;

    let mut salt = [0u8; SALT_LEN];
    fill_random(&mut salt)?;
    let mut derived = derive(password.as_bytes(), &salt, iterations);

    let mut blob = [0u8; BLOB_LEN];
    let (prefix, rest) = blob.split_at_mut(ITERATIONS_LEN);
    let (salt_out, hash_out) = rest.split_at_mut(SALT_LEN);
    prefix.copy_from_slice(&iterations.get().to_le_bytes());
    salt_out.copy_from_slice(&salt);
    hash_out.copy_from_slice(&derived);
    derived.zeroize();

    tracing::debug!(iterations = params.iterations, "password hashed");
    Ok(blob)
}

/// [`hash`], returned as Base64 text.
///
/// # Errors
///
/// Same as [`hash`].
pub fn hash_encoded(password: &str, params: &Pbkdf2Params) -> Result<String, CryptoError> {
    hash(password, params).map(|blob| key_encode(&blob))
}

/// Verify `password` against Base64 text produced by [`hash_encoded`].
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` for empty stored text and
/// `CryptoError::Encoding` if it is not Base64. A decoded blob of the wrong
/// size is a mismatch (`Ok(false)`), not an error.
pub fn verify(password: &str, stored: &str, params: &Pbkdf2Params) -> Result<bool, CryptoError> {
    if stored.is_empty() {
        return Err(CryptoError::InvalidInput("stored hash can't be empty".into()));
    }
    let blob = key_decode(stored)?;
    Ok(verify_blob(password.as_bytes(), &blob, params))
}

/// Verify `password` against a raw stored blob.
///
/// Returns `false` for a blob that is not exactly [`BLOB_LEN`] bytes, that
/// embeds a non-positive iteration count, or whose count exceeds
/// `params.max_iterations`.
#[must_use]
pub fn verify_blob(password: &[u8], blob: &[u8], params: &Pbkdf2Params) -> bool {
    if blob.len() != BLOB_LEN {
        tracing::debug!(len = blob.len(), expected = BLOB_LEN, "stored hash has wrong length");
        return false;
    }
    let Some(iterations) = embedded_iterations(blob) else {
        tracing::debug!("stored hash embeds a non-positive iteration count");
        return false;
    };
    if let Some(max) = params.max_iterations {
        if iterations.get() > max {
            tracing::warn!(
                embedded = iterations.get(),
                max,
                "stored hash exceeds the iteration cap"
            );
            return false;
        }
    }

    let (_, rest) = blob.split_at(ITERATIONS_LEN);
    let (salt, expected) = rest.split_at(SALT_LEN);
    let mut derived = derive(password, salt, iterations);
    let matches = constant_time_eq(&derived, expected);
    derived.zeroize();
    matches
}

/// Read the iteration count embedded in a stored blob.
///
/// Returns `None` if the blob is shorter than the prefix or the count is not
/// positive.
#[must_use]
pub fn embedded_iterations(blob: &[u8]) -> Option<NonZeroU32> {
    let prefix = blob.get(..ITERATIONS_LEN)?;
    let mut bytes = [0u8; ITERATIONS_LEN];
    bytes.copy_from_slice(prefix);
    let count = u32::try_from(i32::from_le_bytes(bytes)).ok()?;
    NonZeroU32::new(count)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
