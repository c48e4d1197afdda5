//! The in-memory store against the shared contract assertions.

use std::sync::Arc;

use crate::repositories::token::conformance;
use crate::repositories::token::memory::MemoryTokenRepository;
use crate::repositories::token::r#trait::TokenRepository;

#[tokio::test]
async fn round_trip() {
    conformance::create_and_get_round_trip(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn duplicate_create() {
    conformance::create_duplicate_id_fails(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn get_missing() {
    conformance::get_missing_token_fails(&MemoryTokenRepository::new()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn use_token_race() {
    conformance::use_token_exactly_once(Arc::new(MemoryTokenRepository::new())).await;
}

#[tokio::test]
async fn use_missing() {
    conformance::use_missing_token_fails(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn empty_change() {
    conformance::empty_change_is_noop(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn unfiltered_change() {
    conformance::unfiltered_change_is_rejected(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn update_variations() {
    conformance::update_by_id_variations(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn filter_conjunction() {
    conformance::update_filter_conjunction(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn listing_pagination() {
    conformance::listing_orders_and_pages(&MemoryTokenRepository::new()).await;
}

#[tokio::test]
async fn listing_temporal_filters() {
    conformance::listing_temporal_filters(&MemoryTokenRepository::new()).await;
}

// The secondary indices fold case; lookups must still hit records whose
// identifiers differ only in case.
#[tokio::test]
async fn id_lookup_is_case_insensitive() {
    let repo = MemoryTokenRepository::new();
    let mut token = conformance::sample_token();
    token.id = token.id.to_uppercase();
    repo.create_token(token.clone()).await.unwrap();

    let stored = repo.get_token(&token.id.to_lowercase()).await.unwrap();
    assert_eq!(token, stored);
}
