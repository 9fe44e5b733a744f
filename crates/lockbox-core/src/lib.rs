//! `lockbox-core` composes vetted primitives into a small toolkit:
//!
//! - [`HashBox`]: SHA-512 digests and HMAC-SHA-512 tags
//! - [`SecretLocker`]: AES-256-CBC locking with a fresh nonce per payload
//! - [`Password`] / [`SecuredPassword`]: PBKDF2 hashes that carry their own
//!   iteration count and salt
//!
//! No primitive is implemented here: hashing, HMAC and PBKDF2 come from
//! `ring`, the block cipher from `aes`/`cbc`, randomness from the OS.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod encoding;
pub mod error;
pub mod memory;
pub mod random;

pub mod key;
pub mod nonce;
pub mod protected;

pub mod hash;

pub mod locker;
pub mod symmetric;

pub mod kdf;
pub mod password;

pub use encoding::{constant_time_eq, key_decode, key_encode};
pub use error::CryptoError;
pub use hash::{Digest, HashBox, DIGEST_LEN};
pub use kdf::{Pbkdf2Params, DEFAULT_ITERATIONS};
pub use key::{Key, KEY_LEN};
pub use locker::{Locked, SecretLocker};
pub use nonce::{Nonce, NONCE_LEN};
pub use password::{Password, SecuredPassword};
pub use protected::{default_storage, PlatformStorage, ProtectedStorage, UnsupportedStorage};
pub use random::random_bytes;
