//! Message digests and keyed authentication tags.
//!
//! This module provides:
//! - [`HashBox`]: computes SHA-512 digests (unkeyed) or HMAC-SHA-512 tags
//!   (keyed) over strings, byte slices, or readers
//! - [`Digest`]: the result, tagged with the mode that produced it
//!
//! A [`Digest::Keyed`] tag can only be checked against a key. The no-key
//! verifiers return `CryptoError::NotSupported` for it instead of silently
//! comparing against a plain hash.

use crate::encoding::{constant_time_eq, encode, key_decode, key_encode};
use crate::error::CryptoError;
use crate::key::Key;
use ring::{digest, hmac};
use std::fmt;
use std::io::{ErrorKind, Read};

/// Digest and tag length in bytes (512 bits).
pub const DIGEST_LEN: usize = 64;

/// Read buffer size for [`HashBox::compute_reader`].
const STREAM_CHUNK: usize = 8192;

// ---------------------------------------------------------------------------
// Digest
// ---------------------------------------------------------------------------

/// Output of a [`HashBox`] computation.
///
/// Deliberately not `PartialEq`: compare with [`Digest::verify_digest`],
/// which runs in constant time.
#[derive(Clone)]
pub enum Digest {
    /// SHA-512 digest.
    Unkeyed(Vec<u8>),
    /// HMAC-SHA-512 tag.
    Keyed(Vec<u8>),
}

impl Digest {
    /// Wrap stored unkeyed digest bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EmptyPayload` if `bytes` is empty.
    pub fn unkeyed(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::EmptyPayload("hash"));
        }
        Ok(Self::Unkeyed(bytes))
    }

    /// Wrap stored keyed tag bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EmptyPayload` if `bytes` is empty.
    pub fn keyed(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.is_empty() {
            return Err(CryptoError::EmptyPayload("tag"));
        }
        Ok(Self::Keyed(bytes))
    }

    /// Parse an unkeyed digest from its Base64 text form.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for empty text, or
    /// `CryptoError::Encoding` for malformed Base64.
    pub fn from_encoded(text: &str) -> Result<Self, CryptoError> {
        Self::unkeyed(decode_text(text)?)
    }

    /// Parse a keyed tag from its Base64 text form.
    ///
    /// # Errors
    ///
    /// Same as [`Digest::from_encoded`].
    pub fn tag_from_encoded(text: &str) -> Result<Self, CryptoError> {
        Self::keyed(decode_text(text)?)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Unkeyed(bytes) | Self::Keyed(bytes) => bytes,
        }
    }

    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        matches!(self, Self::Keyed(_))
    }

    /// Base64 text form.
    #[must_use]
    pub fn encoded(&self) -> String {
        key_encode(self.as_bytes())
    }

    /// Constant-time byte comparison with another digest, regardless of mode.
    #[must_use]
    pub fn verify_digest(&self, other: &Self) -> bool {
        constant_time_eq(self.as_bytes(), other.as_bytes())
    }

    /// Check whether `text` hashes (unkeyed) to this digest.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NotSupported` on a keyed tag, or
    /// `CryptoError::InvalidInput` for empty text.
    pub fn verify_str(&self, text: &str) -> Result<bool, CryptoError> {
        self.require_unkeyed()?;
        let candidate = HashBox::new().compute_str(text)?;
        Ok(self.verify_digest(&candidate))
    }

    /// Check whether `data` hashes (unkeyed) to this digest.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::NotSupported` on a keyed tag, or
    /// `CryptoError::EmptyPayload` for empty data.
    pub fn verify_bytes(&self, data: &[u8]) -> Result<bool, CryptoError> {
        self.require_unkeyed()?;
        let candidate = HashBox::new().compute(data)?;
        Ok(self.verify_digest(&candidate))
    }

    /// Check whether the HMAC of `text` under `key` equals this tag.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for empty text or a cleared key.
    pub fn verify_str_with_key(&self, text: &str, key: &Key) -> Result<bool, CryptoError> {
        let data = encode(text)?;
        self.verify_bytes_with_key(&data, key)
    }

    /// Check whether the HMAC of `data` under `key` equals this tag.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EmptyPayload` for empty data, or
    /// `CryptoError::InvalidInput` for a cleared key.
    pub fn verify_bytes_with_key(&self, data: &[u8], key: &Key) -> Result<bool, CryptoError> {
        if data.is_empty() {
            return Err(CryptoError::EmptyPayload("data"));
        }
        let candidate = hmac_sha512(key, data)?;
        Ok(self.verify_digest(&candidate))
    }

    fn require_unkeyed(&self) -> Result<(), CryptoError> {
        if self.is_keyed() {
            return Err(CryptoError::NotSupported(
                "a keyed tag can only be verified with its key".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unkeyed(_) => write!(f, "Digest::Unkeyed({})", self.encoded()),
            Self::Keyed(_) => write!(f, "Digest::Keyed({})", self.encoded()),
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded())
    }
}

fn decode_text(text: &str) -> Result<Vec<u8>, CryptoError> {
    if text.is_empty() {
        return Err(CryptoError::InvalidInput("hash text can't be empty".into()));
    }
    key_decode(text)
}

// ---------------------------------------------------------------------------
// HashBox
// ---------------------------------------------------------------------------

/// Hashing box: SHA-512 without a key, HMAC-SHA-512 with one.
///
/// Holds its key (if any) for its whole lifetime. Every computation builds a
/// fresh hash context, so a shared `&HashBox` is safe across threads.
#[derive(Debug, Default)]
pub struct HashBox {
    key: Option<Key>,
}

impl HashBox {
    /// Unkeyed box (SHA-512).
    #[must_use]
    pub const fn new() -> Self {
        Self { key: None }
    }

    /// Keyed box (HMAC-SHA-512) owning `key`.
    #[must_use]
    pub const fn with_key(key: Key) -> Self {
        Self { key: Some(key) }
    }

    /// Keyed box with a freshly generated key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the CSPRNG fails.
    pub fn with_generated_key() -> Result<Self, CryptoError> {
        Ok(Self::with_key(Key::generate()?))
    }

    /// The key used for keyed hashing, if any.
    #[must_use]
    pub const fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    #[must_use]
    pub const fn is_keyed(&self) -> bool {
        self.key.is_some()
    }

    /// Hash UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidInput` for empty text.
    pub fn compute_str(&self, text: &str) -> Result<Digest, CryptoError> {
        let data = encode(text)?;
        self.compute(&data)
    }

    /// Hash a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EmptyPayload` for empty data, or
    /// `CryptoError::InvalidInput` if the held key was cleared.
    pub fn compute(&self, data: &[u8]) -> Result<Digest, CryptoError> {
        if data.is_empty() {
            return Err(CryptoError::EmptyPayload("data"));
        }
        tracing::debug!(len = data.len(), keyed = self.is_keyed(), "computing digest");
        match &self.key {
            None => Ok(sha512(data)),
            Some(key) => hmac_sha512(key, data),
        }
    }

    /// Hash everything `reader` yields, in chunks, until EOF.
    ///
    /// An empty stream is hashed like any other input.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Io` if reading fails, or
    /// `CryptoError::InvalidInput` if the held key was cleared.
    pub fn compute_reader<R: Read>(&self, mut reader: R) -> Result<Digest, CryptoError> {
        let mut ctx = match &self.key {
            None => StreamContext::Plain(digest::Context::new(&digest::SHA512)),
            Some(key) => key.with_bytes(|k| {
                let hmac_key = hmac::Key::new(hmac::HMAC_SHA512, k);
                Ok(StreamContext::Keyed(hmac::Context::with_key(&hmac_key)))
            })?,
        };

        let mut buf = [0u8; STREAM_CHUNK];
        let mut total: u64 = 0;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            ctx.update(&buf[..n]);
            total = total.saturating_add(n as u64);
        }
        tracing::debug!(len = total, keyed = self.is_keyed(), "computed stream digest");
        Ok(ctx.finish())
    }

    /// Zero the held key, if any. The box stays keyed but unusable.
    pub fn clear(&mut self) {
        if let Some(key) = self.key.as_mut() {
            key.clear();
        }
    }
}

enum StreamContext {
    Plain(digest::Context),
    Keyed(hmac::Context),
}

impl StreamContext {
    fn update(&mut self, chunk: &[u8]) {
        match self {
            Self::Plain(ctx) => ctx.update(chunk),
            Self::Keyed(ctx) => ctx.update(chunk),
        }
    }

    fn finish(self) -> Digest {
        match self {
            Self::Plain(ctx) => Digest::Unkeyed(ctx.finish().as_ref().to_vec()),
            Self::Keyed(ctx) => Digest::Keyed(ctx.sign().as_ref().to_vec()),
        }
    }
}

fn sha512(data: &[u8]) -> Digest {
    Digest::Unkeyed(digest::digest(&digest::SHA512, data).as_ref().to_vec())
}

fn hmac_sha512(key: &Key, data: &[u8]) -> Result<Digest, CryptoError> {
    key.with_bytes(|k| {
        let hmac_key = hmac::Key::new(hmac::HMAC_SHA512, k);
        Ok(Digest::Keyed(hmac::sign(&hmac_key, data).as_ref().to_vec()))
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
