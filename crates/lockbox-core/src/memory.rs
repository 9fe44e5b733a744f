//! Heap storage for key material.
//!
//! A [`SecretBuffer`] owns its bytes through `secrecy`, which zeroes them on
//! drop. While alive, the pages are pinned with `mlock` where the OS lets us,
//! so keys are not written to swap. `Debug` and `Display` never show content.
//!
//! Pinning is best-effort and page-granular. `mlock` does not count nested
//! locks, so dropping one buffer runs `munlock` over its whole pages, and a
//! smaller key that shares such a page with a live buffer unpins it too. The
//! survivor keeps its bytes and its [`SecretBuffer::is_mlocked`] flag, which
//! records only the outcome of its own `mlock` call.

use crate::error::CryptoError;
use crate::random::fill_random;
use secrecy::{ExposeSecret, SecretSlice};
use std::fmt;
use std::sync::Once;
use zeroize::Zeroize;

/// Masked rendering shared by `Debug` and `Display`.
const MASK: &str = "SecretBuffer(***)";

// ---------------------------------------------------------------------------
// Page pinning
// ---------------------------------------------------------------------------

/// Pin on a byte range; released on drop.
///
/// Holds the address only to hand it back to `munlock`. The bytes themselves
/// are owned by the enclosing [`SecretBuffer`].
struct MemoryPin {
    addr: *const u8,
    len: usize,
    held: bool,
}

// SAFETY: `addr` is never dereferenced, only passed to mlock/munlock.
unsafe impl Send for MemoryPin {}
unsafe impl Sync for MemoryPin {}

impl MemoryPin {
    fn acquire(bytes: &[u8]) -> Self {
        let held = os::lock(bytes.as_ptr(), bytes.len());
        if !held {
            static NOTICE: Once = Once::new();
            NOTICE.call_once(|| {
                tracing::warn!(
                    len = bytes.len(),
                    "mlock refused; key material may reach swap (raise RLIMIT_MEMLOCK)"
                );
            });
        }
        Self {
            addr: bytes.as_ptr(),
            len: bytes.len(),
            held,
        }
    }
}

impl Drop for MemoryPin {
    fn drop(&mut self) {
        if self.held {
            os::unlock(self.addr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// SecretBuffer
// ---------------------------------------------------------------------------

/// Owned, pinned, zeroize-on-drop byte buffer.
pub struct SecretBuffer {
    // Dropped first, so the bytes are wiped while still pinned.
    bytes: SecretSlice<u8>,
    pin: MemoryPin,
}

impl SecretBuffer {
    /// Copy `data` into a fresh buffer. The caller still owns (and should
    /// wipe) `data`.
    #[must_use]
    pub fn new(data: &[u8]) -> Self {
        Self::adopt(data.to_vec())
    }

    /// Buffer of `len` bytes from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Random` if the generator fails.
    pub fn random(len: usize) -> Result<Self, CryptoError> {
        let mut bytes = vec![0u8; len];
        if let Err(e) = fill_random(&mut bytes) {
            bytes.zeroize();
            return Err(e);
        }
        Ok(Self::adopt(bytes))
    }

    /// Take ownership of `bytes` without copying them.
    fn adopt(bytes: Vec<u8>) -> Self {
        let bytes = SecretSlice::from(bytes);
        let pin = MemoryPin::acquire(bytes.expose_secret());
        Self { bytes, pin }
    }

    /// Borrow the raw bytes.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.bytes.expose_secret()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    /// Whether `mlock` succeeded when this buffer was created. See the module
    /// docs for pages shared with buffers dropped since.
    #[must_use]
    pub const fn is_mlocked(&self) -> bool {
        self.pin.held
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK)
    }
}

// ---------------------------------------------------------------------------
// OS bindings
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod os {
    /// Pin `len` bytes at `addr`. An empty range needs no pin.
    pub(super) fn lock(addr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: the kernel validates the range and reports failure via the
        // return value; no memory is read or written.
        unsafe { libc::mlock(addr.cast(), len) == 0 }
    }

    pub(super) fn unlock(addr: *const u8, len: usize) {
        if len != 0 {
            // SAFETY: as in `lock`. A failed unlock only leaves pages pinned.
            unsafe {
                libc::munlock(addr.cast(), len);
            }
        }
    }
}

#[cfg(not(unix))]
mod os {
    pub(super) const fn lock(_addr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) const fn unlock(_addr: *const u8, _len: usize) {}
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
