//! Cryptographic error types for `lockbox-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Missing, empty or wrongly sized argument (key, stored blob, length).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A payload that must carry at least one byte was empty.
    #[error("invalid input: {0} can't be empty")]
    EmptyPayload(&'static str),

    /// The operation is intentionally undefined for this value's mode.
    #[error("operation not supported: {0}")]
    NotSupported(String),

    /// No protected-storage service exists on the current platform.
    #[error("protected storage is not available on this platform")]
    PlatformUnsupported,

    /// Decryption failed: wrong key, invalid nonce, or corrupted ciphertext.
    ///
    /// The cause is deliberately not reported.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Combined blob is structurally malformed (truncated header or nonce).
    #[error("malformed locked blob: {0}")]
    Format(String),

    /// Text codec failure (invalid Base64 or UTF-8).
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The operating system CSPRNG failed.
    #[error("random generation failed: {0}")]
    Random(String),

    /// The platform protected-storage call itself failed.
    #[error("protected storage error: {0}")]
    ProtectedStorage(String),

    /// Reading a hashed stream failed.
    #[error("stream read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl CryptoError {
    /// Returns `true` for the caller-correctable input errors
    /// ([`CryptoError::InvalidInput`] and [`CryptoError::EmptyPayload`]).
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::EmptyPayload(_))
    }
}
