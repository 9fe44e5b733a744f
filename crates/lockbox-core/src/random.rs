//! Randomness source backed by the operating system CSPRNG.

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;

/// Return `n` cryptographically secure random bytes.
///
/// # Errors
///
/// Returns `CryptoError::InvalidInput` if `n` is zero, or
/// `CryptoError::Random` if the OS generator fails.
pub fn random_bytes(n: usize) -> Result<Vec<u8>, CryptoError> {
    if n == 0 {
        return Err(CryptoError::InvalidInput(
            "random byte count must be greater than zero".into(),
        ));
    }
    let mut bytes = vec![0u8; n];
    fill_random(&mut bytes)?;
    Ok(bytes)
}

/// Fill `buf` with cryptographically secure random bytes.
///
/// # Errors
///
/// Returns `CryptoError::Random` if the OS generator fails.
pub fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| CryptoError::Random(format!("CSPRNG fill failed: {e}")))
}
