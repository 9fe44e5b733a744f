//! Protected storage of key material.
//!
//! This crate does not implement protected storage itself. It defines the
//! [`ProtectedStorage`] boundary that an application injects at the edge,
//! plus two stock backends:
//! - [`PlatformStorage`]: Windows DPAPI (`CryptProtectData`) for the
//!   current user; `PlatformUnsupported` on every other OS
//! - [`UnsupportedStorage`]: always `PlatformUnsupported`
//!
//! Protected blobs are opaque. They are only meaningful to the backend that
//! produced them.

use crate::error::CryptoError;

/// OS service that encrypts/decrypts data bound to the current user or
/// machine.
pub trait ProtectedStorage: Send + Sync {
    /// Wrap `data` into an opaque blob.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::PlatformUnsupported` when no service exists, or
    /// `CryptoError::ProtectedStorage` when the service call fails.
    fn protect(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Recover the bytes wrapped by [`ProtectedStorage::protect`].
    ///
    /// The caller owns the returned buffer and is responsible for zeroizing it.
    ///
    /// # Errors
    ///
    /// Same as [`ProtectedStorage::protect`].
    fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Human-readable backend name.
    fn backend_name(&self) -> &'static str;
}

/// Backend for platforms without a protected-storage service.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedStorage;

impl ProtectedStorage for UnsupportedStorage {
    fn protect(&self, _data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::PlatformUnsupported)
    }

    fn unprotect(&self, _blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::PlatformUnsupported)
    }

    fn backend_name(&self) -> &'static str {
        "unsupported"
    }
}

/// The protected-storage service of the platform this crate was built for.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlatformStorage;

impl PlatformStorage {
    /// Returns `true` if this platform has a protected-storage service.
    #[must_use]
    pub const fn is_available() -> bool {
        platform::AVAILABLE
    }
}

impl ProtectedStorage for PlatformStorage {
    fn protect(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let blob = platform::protect(data)?;
        tracing::debug!(backend = platform::NAME, len = blob.len(), "key material protected");
        Ok(blob)
    }

    fn unprotect(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        platform::unprotect(blob)
    }

    fn backend_name(&self) -> &'static str {
        platform::NAME
    }
}

/// Return the platform backend as a trait object.
#[must_use]
pub fn default_storage() -> Box<dyn ProtectedStorage> {
    if !PlatformStorage::is_available() {
        tracing::warn!("protected storage unavailable; callers must manage key storage");
    }
    Box::new(PlatformStorage)
}

// ---------------------------------------------------------------------------
// Platform-specific implementations
// ---------------------------------------------------------------------------

#[cfg(windows)]
mod platform {
    use crate::error::CryptoError;
    use std::ptr;
    use windows_sys::Win32::Foundation::LocalFree;
    use windows_sys::Win32::Security::Cryptography::{
        CryptProtectData, CryptUnprotectData, CRYPTPROTECT_UI_FORBIDDEN, CRYPT_INTEGER_BLOB,
    };
    use zeroize::Zeroize;

    pub(super) const AVAILABLE: bool = true;
    pub(super) const NAME: &str = "dpapi";

    fn input_blob(data: &[u8]) -> Result<CRYPT_INTEGER_BLOB, CryptoError> {
        let len = u32::try_from(data.len())
            .map_err(|_| CryptoError::InvalidInput("blob exceeds 4 GiB".into()))?;
        Ok(CRYPT_INTEGER_BLOB {
            cbData: len,
            pbData: data.as_ptr().cast_mut(),
        })
    }

    /// Copy a DPAPI-allocated blob into a `Vec` and release it with `LocalFree`.
    fn take_output(blob: &CRYPT_INTEGER_BLOB) -> Result<Vec<u8>, CryptoError> {
        let len = usize::try_from(blob.cbData)
            .map_err(|_| CryptoError::ProtectedStorage("output length overflow".into()))?;
        // SAFETY: DPAPI returned `cbData` initialized bytes at `pbData`.
        let out = unsafe { std::slice::from_raw_parts(blob.pbData, len) }.to_vec();
        // SAFETY: `pbData` was allocated by DPAPI with LocalAlloc and is freed
        // exactly once here. Unprotected output holds key material, so it is
        // wiped first.
        unsafe {
            std::slice::from_raw_parts_mut(blob.pbData, len).zeroize();
            LocalFree(blob.pbData as _);
        }
        Ok(out)
    }

    pub(super) fn protect(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let input = input_blob(data)?;
        let mut output = CRYPT_INTEGER_BLOB {
            cbData: 0,
            pbData: ptr::null_mut(),
        };
        // SAFETY: all pointers are valid for the duration of the call; the
        // optional arguments are null, which DPAPI accepts.
        let ok = unsafe {
            CryptProtectData(
                &raw const input,
                ptr::null(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
                CRYPTPROTECT_UI_FORBIDDEN,
                &raw mut output,
            )
        };
        if ok == 0 {
            return Err(CryptoError::ProtectedStorage(format!(
                "CryptProtectData failed: {}",
                std::io::Error::last_os_error()
            )));
        }
        take_output(&output)
    }

    pub(super) fn unprotect(blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let input = input_blob(blob)?;
        let mut output = CRYPT_INTEGER_BLOB {
            cbData: 0,
            pbData: ptr::null_mut(),
        };
        // SAFETY: as in `protect`; the description out-pointer is null.
        let ok = unsafe {
            CryptUnprotectData(
                &raw const input,
                ptr::null_mut(),
                ptr::null(),
                ptr::null(),
                ptr::null(),
                CRYPTPROTECT_UI_FORBIDDEN,
                &raw mut output,
            )
        };
        if ok == 0 {
            return Err(CryptoError::ProtectedStorage(format!(
                "CryptUnprotectData failed: {}",
                std::io::Error::last_os_error()
            )));
        }
        take_output(&output)
    }
}

#[cfg(not(windows))]
mod platform {
    use crate::error::CryptoError;

    pub(super) const AVAILABLE: bool = false;
    pub(super) const NAME: &str = "none";

    pub(super) fn protect(_data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::PlatformUnsupported)
    }

    pub(super) fn unprotect(_blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::PlatformUnsupported)
    }
}
