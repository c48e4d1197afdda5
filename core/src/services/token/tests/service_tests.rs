//! Tests for envelope minting and validation against the in-memory store.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RefreshTokenChange};
use crate::errors::{InvalidTokenCause, TokenError};
use crate::repositories::token::memory::MemoryTokenRepository;
use crate::repositories::token::r#trait::TokenRepository;
use crate::services::token::key_manager::RsaKeyManager;
use crate::services::token::service::{Claims, TokenService};

use super::{ROTATED_PRIVATE_KEY, ROTATED_PUBLIC_KEY, TEST_PRIVATE_KEY, TEST_PUBLIC_KEY};

const ISSUER: &str = "tokens-test";

fn service() -> TokenService<MemoryTokenRepository> {
    let keys = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY)
        .expect("failed to load test keys");
    TokenService::with_keys(MemoryTokenRepository::new(), ISSUER.to_string(), keys)
}

fn sample_token() -> RefreshToken {
    RefreshToken {
        id: Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        created_from: "tests".to_string(),
        scopes: vec!["read".to_string(), "write".to_string()],
        profile_id: Uuid::new_v4().to_string(),
        client_id: Uuid::new_v4().to_string(),
        account_id: Uuid::new_v4().to_string(),
        revoked: false,
        used: false,
    }
}

fn invalid_cause(err: TokenError) -> InvalidTokenCause {
    match err {
        TokenError::InvalidToken { cause } => cause,
        other => panic!("expected InvalidToken, got {other:?}"),
    }
}

#[tokio::test]
async fn test_mint_and_validate_round_trip() {
    let service = service();
    let token = sample_token();
    service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();

    let envelope = service.create_jwt(&token).unwrap();
    let record = service.validate(&envelope).await.unwrap();

    assert_eq!(token, record);
}

#[tokio::test]
async fn test_validate_does_not_consume_the_token() {
    let service = service();
    let token = sample_token();
    service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();
    let envelope = service.create_jwt(&token).unwrap();

    service.validate(&envelope).await.unwrap();
    let record = service.validate(&envelope).await.unwrap();

    assert!(!record.used);
}

#[tokio::test]
async fn test_validate_rejects_revoked_token() {
    let service = service();
    let token = sample_token();
    service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();
    let envelope = service.create_jwt(&token).unwrap();

    service
        .repository()
        .update_tokens(RefreshTokenChange {
            id: token.id.clone(),
            revoked: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(
        Err(TokenError::TokenRevoked),
        service.validate(&envelope).await,
    );
}

#[tokio::test]
async fn test_validate_rejects_used_token() {
    let service = service();
    let token = sample_token();
    service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();
    let envelope = service.create_jwt(&token).unwrap();

    service.repository().use_token(&token.id).await.unwrap();

    assert_eq!(
        Err(TokenError::TokenUsed),
        service.validate(&envelope).await,
    );
}

#[tokio::test]
async fn test_validate_masks_missing_record() {
    let service = service();
    // minted but never stored
    let envelope = service.create_jwt(&sample_token()).unwrap();

    let cause = invalid_cause(service.validate(&envelope).await.unwrap_err());
    assert_eq!(InvalidTokenCause::UnknownToken, cause);
}

#[tokio::test]
async fn test_validate_rejects_non_rsa_algorithm() {
    let service = service();
    let token = sample_token();
    service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();

    let claims = Claims::for_token(&token, ISSUER);
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(service.key_fingerprint().to_string());
    let envelope = encode(&header, &claims, &EncodingKey::from_secret(b"shared-secret"))
        .expect("failed to sign with shared secret");

    let cause = invalid_cause(service.validate(&envelope).await.unwrap_err());
    assert!(matches!(
        cause,
        InvalidTokenCause::UnexpectedSigningMethod(_)
    ));
}

#[tokio::test]
async fn test_validate_rejects_unknown_signing_key() {
    let old_keys = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY).unwrap();
    let old_service = TokenService::with_keys(
        MemoryTokenRepository::new(),
        ISSUER.to_string(),
        old_keys,
    );
    let token = sample_token();
    old_service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();
    let envelope = old_service.create_jwt(&token).unwrap();

    // the service rotates to a new key pair; envelopes minted under the old
    // key must stop verifying
    let rotated_keys =
        RsaKeyManager::from_pem_strings(ROTATED_PRIVATE_KEY, ROTATED_PUBLIC_KEY).unwrap();
    let rotated_service = TokenService::with_keys(
        MemoryTokenRepository::new(),
        ISSUER.to_string(),
        rotated_keys,
    );
    rotated_service
        .repository()
        .create_token(token)
        .await
        .unwrap();

    let cause = invalid_cause(rotated_service.validate(&envelope).await.unwrap_err());
    assert_eq!(InvalidTokenCause::UnknownSigningKey, cause);
}

#[tokio::test]
async fn test_validate_rejects_expired_envelope() {
    let service = service();
    let mut token = sample_token();
    // old enough that created_at + 14d is comfortably past
    token.created_at = Utc::now() - TimeDelta::days(15);
    service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();
    let envelope = service.create_jwt(&token).unwrap();

    let cause = invalid_cause(service.validate(&envelope).await.unwrap_err());
    assert_eq!(InvalidTokenCause::Expired, cause);
}

#[tokio::test]
async fn test_validate_rejects_not_yet_valid_envelope() {
    let service = service();
    let mut token = sample_token();
    // nbf is created_at minus an hour, so two hours out is still immature
    token.created_at = Utc::now() + TimeDelta::hours(2);
    service
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();
    let envelope = service.create_jwt(&token).unwrap();

    let cause = invalid_cause(service.validate(&envelope).await.unwrap_err());
    assert_eq!(InvalidTokenCause::NotYetValid, cause);
}

#[tokio::test]
async fn test_validate_rejects_garbage() {
    let service = service();

    let cause = invalid_cause(service.validate("not-an-envelope").await.unwrap_err());
    assert_eq!(InvalidTokenCause::Malformed, cause);
}

#[tokio::test]
async fn test_validate_rejects_wrong_issuer() {
    let keys = RsaKeyManager::from_pem_strings(TEST_PRIVATE_KEY, TEST_PUBLIC_KEY).unwrap();
    let minting = TokenService::with_keys(
        MemoryTokenRepository::new(),
        "someone-else".to_string(),
        keys.clone(),
    );
    let validating =
        TokenService::with_keys(MemoryTokenRepository::new(), ISSUER.to_string(), keys);

    let token = sample_token();
    validating
        .repository()
        .create_token(token.clone())
        .await
        .unwrap();
    let envelope = minting.create_jwt(&token).unwrap();

    let cause = invalid_cause(validating.validate(&envelope).await.unwrap_err());
    assert_eq!(InvalidTokenCause::Malformed, cause);
}

#[test]
fn test_claims_temporal_layout() {
    let token = sample_token();
    let claims = Claims::for_token(&token, ISSUER);

    assert_eq!(token.profile_id, claims.sub);
    assert_eq!(token.client_id, claims.aud);
    assert_eq!(token.id, claims.jti);
    assert_eq!(ISSUER, claims.iss);
    assert_eq!(token.created_at.timestamp(), claims.iat);
    assert_eq!(claims.iat + 14 * 24 * 60 * 60, claims.exp);
    assert_eq!(claims.iat - 60 * 60, claims.nbf);
}
