//! Tests for RSA key loading and public-key fingerprinting.

use crate::errors::TokenError;
use crate::services::token::key_manager::RsaKeyManager;

use super::{
    ROTATED_PRIVATE_KEY, ROTATED_PUBLIC_KEY, ROTATED_PUBLIC_KEY_FINGERPRINT, TEST_PRIVATE_KEY,
    TEST_PUBLIC_KEY, TEST_PUBLIC_KEY_FINGERPRINT,
};

#[test]
fn test_fingerprint_matches_ssh_keygen() {
    let keys = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY)
        .expect("failed to load keys");

    assert_eq!(TEST_PUBLIC_KEY_FINGERPRINT, keys.fingerprint());
}

#[test]
fn test_fingerprint_is_stable() {
    let first = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY).unwrap();
    let second = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY).unwrap();

    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn test_distinct_keys_have_distinct_fingerprints() {
    let first = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY).unwrap();
    let rotated =
        RsaKeyManager::from_pem_strings(ROTATED_PRIVATE_KEY, ROTATED_PUBLIC_KEY).unwrap();

    assert_eq!(ROTATED_PUBLIC_KEY_FINGERPRINT, rotated.fingerprint());
    assert_ne!(first.fingerprint(), rotated.fingerprint());
}

#[test]
fn test_invalid_private_key_is_rejected() {
    let err = RsaKeyManager::from_pem_strings("not a key", TEST_PUBLIC_KEY).unwrap_err();
    assert!(matches!(err, TokenError::Key { .. }));
}

#[test]
fn test_invalid_public_key_is_rejected() {
    let err = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, "not a key").unwrap_err();
    assert!(matches!(err, TokenError::Key { .. }));
}

#[test]
fn test_missing_key_files_are_rejected() {
    let err = RsaKeyManager::new(
        "/nonexistent/private.pem",
        "/nonexistent/public.pem",
    )
    .unwrap_err();
    assert!(matches!(err, TokenError::Key { .. }));
}
