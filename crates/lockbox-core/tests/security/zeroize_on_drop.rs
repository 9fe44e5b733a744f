//! Verify that `SecretBuffer` and `Key` actually zero memory when released.
//!
//! After the buffer is zeroed and deallocated, the allocator may write
//! metadata (free-list pointers, etc.) into the freed block, so we scan for
//! a sentinel pattern rather than asserting all-zeros.
//!
//! **UB caveat:** Reading freed memory is technically undefined behavior.
//! These are best-effort smoke tests that work reliably under the debug
//! profile (default `cargo test`). Run them in debug mode only.

use lockbox_core::memory::SecretBuffer;
use lockbox_core::{HashBox, Key, SecretLocker};

/// Sentinel pattern used to verify zeroization.
const SENTINEL: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

fn sentinel_data(len: usize) -> Vec<u8> {
    SENTINEL.iter().copied().cycle().take(len).collect()
}

/// Scan `len` bytes at `ptr` for the sentinel.
///
/// # Safety
///
/// `ptr` must have pointed at an allocation of at least `len` bytes. The
/// allocation may already be freed; see the module note.
unsafe fn sentinel_present(ptr: *const u8, len: usize) -> bool {
    let slice = unsafe { std::slice::from_raw_parts(ptr, len) };
    slice.windows(4).any(|w| w == SENTINEL)
}

fn key_region(key: &Key) -> (*const u8, usize) {
    key.with_bytes(|bytes| Ok((bytes.as_ptr(), bytes.len())))
        .expect("key should not be cleared")
}

#[test]
fn secret_buffer_sentinel_not_found_after_drop() {
    let data = sentinel_data(512);

    let data_ptr: *const u8;
    let data_len: usize;
    {
        let buf = SecretBuffer::new(&data);
        let exposed = buf.expose();
        data_ptr = exposed.as_ptr();
        data_len = exposed.len();
        assert_eq!(&exposed[..4], &SENTINEL);
    }

    // SAFETY: best-effort read of just-freed memory, see module note.
    let found = unsafe { sentinel_present(data_ptr, data_len) };
    assert!(!found, "sentinel found in memory after SecretBuffer drop");
}

#[test]
fn secret_buffer_large_allocation_sentinel_cleared() {
    // 64KB to be above common allocator thresholds.
    let data = sentinel_data(65536);

    let data_ptr: *const u8;
    let data_len: usize;
    {
        let buf = SecretBuffer::new(&data);
        data_ptr = buf.expose().as_ptr();
        data_len = buf.len();
    }

    // SAFETY: best-effort read of just-freed memory, see module note.
    let found = unsafe { sentinel_present(data_ptr, data_len) };
    assert!(!found, "sentinel found in 64KB SecretBuffer after drop");
}

#[test]
fn key_sentinel_not_found_after_drop() {
    let data = sentinel_data(64);
    let (data_ptr, data_len) = {
        let key = Key::from_bytes(&data).expect("key");
        key_region(&key)
    };

    // SAFETY: best-effort read of just-freed memory, see module note.
    let found = unsafe { sentinel_present(data_ptr, data_len) };
    assert!(!found, "sentinel found in memory after Key drop");
}

#[test]
fn key_sentinel_not_found_after_clear() {
    let data = sentinel_data(64);
    let mut key = Key::from_bytes(&data).expect("key");
    let (data_ptr, data_len) = key_region(&key);
    key.clear();
    assert!(key.is_cleared());

    // SAFETY: best-effort read of just-freed memory, see module note.
    let found = unsafe { sentinel_present(data_ptr, data_len) };
    assert!(!found, "sentinel found in memory after Key::clear");
}

#[test]
fn locker_and_hash_box_clear_their_keys() {
    let data = sentinel_data(32);

    let mut locker = SecretLocker::new(Key::from_bytes(&data).expect("key"));
    let (locker_ptr, locker_len) = key_region(locker.key());
    locker.clear();

    let mut hash_box = HashBox::with_key(Key::from_bytes(&data).expect("key"));
    let (box_ptr, box_len) = key_region(hash_box.key().expect("keyed"));
    hash_box.clear();

    // SAFETY: best-effort read of just-freed memory, see module note.
    unsafe {
        assert!(!sentinel_present(locker_ptr, locker_len));
        assert!(!sentinel_present(box_ptr, box_len));
    }
}

#[test]
fn secret_types_need_drop() {
    assert!(std::mem::needs_drop::<SecretBuffer>());
    assert!(std::mem::needs_drop::<Key>());
    assert!(std::mem::needs_drop::<SecretLocker>());
    assert!(std::mem::needs_drop::<HashBox>());
}
