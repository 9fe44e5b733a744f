//! Integration tests for the secret locker.
//!
//! Lock → transport (struct, combined blob, Base64, JSON) → unlock.

use lockbox_core::{CryptoError, Key, Locked, Nonce, SecretLocker};

const PAYLOAD: &str = "eine kuh macht muh, viele kühe machen mühe";

#[test]
fn lock_encode_decode_unlock() {
    let locker = SecretLocker::with_generated_key().expect("locker");
    let text = locker.lock_str(PAYLOAD).expect("lock").encoded().expect("encode");

    let parsed = Locked::from_encoded(&text).expect("parse");
    assert_eq!(locker.unlock_str(&parsed).expect("unlock"), PAYLOAD);
}

#[test]
fn locked_survives_json() {
    let locker = SecretLocker::with_generated_key().expect("locker");
    let locked = locker.lock(b"\x00\x01binary\xff").expect("lock");

    let json = serde_json::to_string(&locked).expect("serialize");
    let restored: Locked = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, locked);
    assert_eq!(
        locker.unlock_bytes(&restored).expect("unlock"),
        b"\x00\x01binary\xff"
    );
}

#[test]
fn second_locker_with_same_key_unlocks() {
    let raw = [0x42u8; 32];
    let sender = SecretLocker::new(Key::from_bytes(&raw).expect("key"));
    let receiver = SecretLocker::new(Key::from_bytes(&raw).expect("key"));

    let blob = sender.lock_str(PAYLOAD).expect("lock").combined().expect("combined");
    let locked = Locked::from_combined(&blob).expect("parse");
    assert_eq!(receiver.unlock_str(&locked).expect("unlock"), PAYLOAD);
}

#[test]
fn locker_with_other_key_cannot_unlock() {
    let sender = SecretLocker::with_generated_key().expect("locker");
    let intruder = SecretLocker::with_generated_key().expect("locker");
    let locked = sender.lock_str(PAYLOAD).expect("lock");

    match intruder.unlock_str(&locked) {
        Err(e) => assert!(matches!(e, CryptoError::DecryptionFailed)),
        Ok(text) => assert_ne!(text, PAYLOAD),
    }
}

#[test]
fn explicit_nonce_pairing_roundtrips() {
    let locker = SecretLocker::with_generated_key().expect("locker");
    let locked = locker.lock_str(PAYLOAD).expect("lock");

    let rebuilt = Locked::new(
        locked.ciphertext().to_vec(),
        Nonce::from_bytes(locked.nonce().as_bytes()),
    );
    assert_eq!(locker.unlock_str(&rebuilt).expect("unlock"), PAYLOAD);
}

#[test]
fn cleared_locker_refuses_work() {
    let mut locker = SecretLocker::with_generated_key().expect("locker");
    let locked = locker.lock_str(PAYLOAD).expect("lock");
    locker.clear();

    assert!(locker.key().is_cleared());
    assert!(locker.lock_str(PAYLOAD).expect_err("cleared").is_invalid_input());
    assert!(locker.unlock_str(&locked).is_err());
}

#[test]
fn empty_inputs_are_rejected() {
    let locker = SecretLocker::with_generated_key().expect("locker");
    assert!(locker.lock(&[]).expect_err("empty bytes").is_invalid_input());
    assert!(locker.lock_str("").expect_err("empty text").is_invalid_input());
    assert!(Locked::from_encoded("").expect_err("empty text").is_invalid_input());
}

#[test]
fn malformed_combined_blobs_are_rejected() {
    assert!(matches!(
        Locked::from_combined(&[16, 0, 0]),
        Err(CryptoError::Format(_))
    ));
    assert!(matches!(
        Locked::from_combined(&[0xFF, 0xFF, 0xFF, 0xFF, 1, 2, 3]),
        Err(CryptoError::Format(_))
    ));
    assert!(matches!(
        Locked::from_combined(&[16, 0, 0, 0, 1, 2, 3]),
        Err(CryptoError::Format(_))
    ));
    assert!(matches!(
        Locked::from_encoded("not base64!"),
        Err(CryptoError::Encoding(_))
    ));
}
