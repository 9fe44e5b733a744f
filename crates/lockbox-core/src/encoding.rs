//! Secure codec: text ↔ bytes, bytes ↔ Base64 text, and constant-time
//! comparison.
//!
//! Every value this crate exposes as text (digests, locked blobs, stored
//! password hashes) goes through [`key_encode`] / [`key_decode`], so any two
//! components can interoperate purely through their textual forms.

use crate::error::CryptoError;
use data_encoding::BASE64;
use zeroize::Zeroize;

/// Encode human-readable text to bytes (UTF-8).
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` if `text` is empty.
pub fn encode(text: &str) -> Result<Vec<u8>, CryptoError> {
    if text.is_empty() {
        return Err(CryptoError::InvalidInput("text can't be empty".into()));
    }
    Ok(text.as_bytes().to_vec())
}

/// Decode UTF-8 bytes back to text.
///
/// # Errors
///
/// Returns `CryptoError::Encoding` if the bytes are not valid UTF-8. The
/// rejected bytes are zeroed before the error is returned.
pub fn decode(bytes: Vec<u8>) -> Result<String, CryptoError> {
    String::from_utf8(bytes).map_err(|e| {
        let reason = e.utf8_error();
        e.into_bytes().zeroize();
        CryptoError::Encoding(format!("invalid UTF-8: {reason}"))
    })
}

/// Encode binary data as standard padded Base64.
#[must_use]
pub fn key_encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode standard padded Base64 back to bytes.
///
/// # Errors
///
/// Returns `CryptoError::Encoding` if `text` is not valid Base64.
pub fn key_decode(text: &str) -> Result<Vec<u8>, CryptoError> {
    BASE64
        .decode(text.as_bytes())
        .map_err(|e| CryptoError::Encoding(format!("invalid base64: {e}")))
}

/// Constant-time byte comparison.
///
/// Returns `true` iff both slices have equal length and identical contents.
/// Uses bitwise OR accumulation so the running time does not depend on the
/// position of the first differing byte. Slice lengths are treated as public.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    std::hint::black_box(diff) == 0
}
