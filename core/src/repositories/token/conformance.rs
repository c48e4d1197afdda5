//! Contract assertions shared by every token storage backend.
//!
//! Each helper drives one observable guarantee of [`TokenRepository`] and
//! panics on violation. Backend test suites call every helper (the
//! in-memory store from its unit tests, the PostgreSQL store from its
//! integration tests) so both implementations answer to the same set of
//! assertions. Helpers scope themselves to freshly generated UUIDs and are
//! safe to run against a shared database.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RefreshTokenChange, NUM_TOKEN_RESULTS};
use crate::errors::TokenError;

use super::r#trait::TokenRepository;

/// The relational backend keeps timestamps at millisecond precision, so
/// comparisons only hold for values rounded going in.
fn truncated_now() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::milliseconds(1)).unwrap_or(now)
}

/// A fully populated record with fresh identifiers.
pub fn sample_token() -> RefreshToken {
    RefreshToken {
        id: Uuid::new_v4().to_string(),
        created_at: truncated_now() - TimeDelta::hours(1),
        created_from: "conformance".to_string(),
        scopes: vec![
            "https://scopes.example.org/tokens/manage".to_string(),
            "https://scopes.example.org/profiles/view:me".to_string(),
        ],
        profile_id: Uuid::new_v4().to_string(),
        client_id: Uuid::new_v4().to_string(),
        account_id: Uuid::new_v4().to_string(),
        revoked: false,
        used: false,
    }
}

/// A created record reads back field-by-field identical, scope order included.
pub async fn create_and_get_round_trip<R: TokenRepository>(repo: &R) {
    let token = sample_token();
    repo.create_token(token.clone())
        .await
        .expect("error creating token");

    let stored = repo.get_token(&token.id).await.expect("error getting token");
    assert_eq!(token, stored);
}

/// A second create with the same ID fails and leaves the record unchanged.
pub async fn create_duplicate_id_fails<R: TokenRepository>(repo: &R) {
    let token = sample_token();
    repo.create_token(token.clone())
        .await
        .expect("error creating token");

    let mut duplicate = sample_token();
    duplicate.id = token.id.clone();
    assert_eq!(
        Err(TokenError::TokenAlreadyExists),
        repo.create_token(duplicate).await,
    );

    let stored = repo.get_token(&token.id).await.expect("error getting token");
    assert_eq!(token, stored);
}

/// Fetching an ID that was never created fails with `TokenNotFound`.
pub async fn get_missing_token_fails<R: TokenRepository>(repo: &R) {
    let id = Uuid::new_v4().to_string();
    assert_eq!(Err(TokenError::TokenNotFound), repo.get_token(&id).await);
}

/// Twenty concurrent `use_token` calls on one record: exactly one winner,
/// nineteen `TokenUsed` losers, nothing else.
pub async fn use_token_exactly_once<R: TokenRepository + 'static>(repo: Arc<R>) {
    let token = sample_token();
    repo.create_token(token.clone())
        .await
        .expect("error creating token");

    let mut handles = Vec::with_capacity(20);
    for _ in 0..20 {
        let repo = Arc::clone(&repo);
        let id = token.id.clone();
        handles.push(tokio::spawn(async move { repo.use_token(&id).await }));
    }

    let mut successes = 0;
    let mut used_errors = 0;
    for handle in handles {
        match handle.await.expect("use_token task panicked") {
            Ok(()) => successes += 1,
            Err(TokenError::TokenUsed) => used_errors += 1,
            Err(err) => panic!("unexpected error using token: {err}"),
        }
    }
    assert_eq!(1, successes, "expected exactly one caller to win");
    assert_eq!(19, used_errors, "expected every loser to see TokenUsed");

    let stored = repo.get_token(&token.id).await.expect("error getting token");
    assert!(stored.used);
}

/// Using an ID that was never created fails with `TokenNotFound`.
pub async fn use_missing_token_fails<R: TokenRepository>(repo: &R) {
    let id = Uuid::new_v4().to_string();
    assert_eq!(Err(TokenError::TokenNotFound), repo.use_token(&id).await);
}

/// An empty change is a successful no-op, filtered or not.
pub async fn empty_change_is_noop<R: TokenRepository>(repo: &R) {
    let token = sample_token();
    repo.create_token(token.clone())
        .await
        .expect("error creating token");

    repo.update_tokens(RefreshTokenChange {
        id: token.id.clone(),
        ..Default::default()
    })
    .await
    .expect("error applying empty filtered change");

    repo.update_tokens(RefreshTokenChange::default())
        .await
        .expect("error applying empty unfiltered change");

    let stored = repo.get_token(&token.id).await.expect("error getting token");
    assert_eq!(token, stored);
}

/// Mutations without any filter are rejected.
pub async fn unfiltered_change_is_rejected<R: TokenRepository>(repo: &R) {
    let change = RefreshTokenChange {
        revoked: Some(true),
        ..Default::default()
    };
    assert_eq!(
        Err(TokenError::NoChangeFilter),
        repo.update_tokens(change).await,
    );
}

/// Every combination of mutation fields applied through an ID filter lands
/// in the store exactly as `apply_change` describes it.
pub async fn update_by_id_variations<R: TokenRepository>(repo: &R) {
    let variations = [
        (Some(true), None),
        (None, Some(false)),
        (Some(true), Some(true)),
        (Some(false), Some(false)),
    ];

    for (revoked, used) in variations {
        let mut token = sample_token();
        token.used = true;
        repo.create_token(token.clone())
            .await
            .expect("error creating token");

        let change = RefreshTokenChange {
            id: token.id.clone(),
            revoked,
            used,
            ..Default::default()
        };
        repo.update_tokens(change.clone())
            .await
            .expect("error updating token");

        let expected = token.apply_change(&change);
        let stored = repo
            .get_token(&expected.id)
            .await
            .expect("error getting token");
        assert_eq!(expected, stored, "mismatch for change {change:?}");
    }
}

/// A change with several filters updates the intersection of their match
/// sets and nothing else.
pub async fn update_filter_conjunction<R: TokenRepository>(repo: &R) {
    let profiles: Vec<String> = (0..3).map(|_| Uuid::new_v4().to_string()).collect();
    let clients: Vec<String> = (0..3).map(|_| Uuid::new_v4().to_string()).collect();
    let accounts: Vec<String> = (0..3).map(|_| Uuid::new_v4().to_string()).collect();

    let mut tokens = Vec::with_capacity(100);
    for pos in 0..100 {
        let mut token = sample_token();
        token.profile_id = profiles[pos % 3].clone();
        token.client_id = clients[(pos / 3) % 3].clone();
        token.account_id = accounts[(pos / 9) % 3].clone();
        repo.create_token(token.clone())
            .await
            .expect("error creating token");
        tokens.push(token);
    }

    let change = RefreshTokenChange {
        profile_id: profiles[1].clone(),
        client_id: clients[2].clone(),
        revoked: Some(true),
        ..Default::default()
    };
    repo.update_tokens(change.clone())
        .await
        .expect("error updating tokens");

    for token in tokens {
        let stored = repo.get_token(&token.id).await.expect("error getting token");
        let should_match = token.profile_id == change.profile_id
            && token.client_id == change.client_id;
        assert_eq!(
            should_match, stored.revoked,
            "revoked mismatch for token {}",
            token.id,
        );
        assert_eq!(token.used, stored.used);
    }
}

/// Listing returns at most 25 records, newest first, and paging with a
/// moving `before` cursor enumerates every record exactly once.
pub async fn listing_orders_and_pages<R: TokenRepository>(repo: &R) {
    let profile_id = Uuid::new_v4().to_string();
    let base = truncated_now() - TimeDelta::days(1);

    let mut ids = HashSet::with_capacity(100);
    for pos in 0..100 {
        let mut token = sample_token();
        token.profile_id = profile_id.clone();
        token.created_at = base + TimeDelta::seconds(pos);
        repo.create_token(token.clone())
            .await
            .expect("error creating token");
        ids.insert(token.id);
    }

    let mut seen = HashSet::new();
    let mut pages = 0;
    let mut before: Option<DateTime<Utc>> = None;
    loop {
        let page = repo
            .get_tokens_by_profile_id(&profile_id, None, before)
            .await
            .expect("error listing tokens");
        if page.is_empty() {
            break;
        }
        pages += 1;
        assert!(page.len() <= NUM_TOKEN_RESULTS);
        for window in page.windows(2) {
            assert!(
                window[0].created_at > window[1].created_at,
                "page not in descending created_at order",
            );
        }
        for token in &page {
            assert!(seen.insert(token.id.clone()), "token {} listed twice", token.id);
        }
        before = page.last().map(|token| token.created_at);
    }

    assert_eq!(4, pages);
    assert_eq!(ids, seen);
}

/// `since` and `before` cut the listing strictly around the boundary.
pub async fn listing_temporal_filters<R: TokenRepository>(repo: &R) {
    let profile_id = Uuid::new_v4().to_string();
    let other_profile_id = Uuid::new_v4().to_string();
    let now = truncated_now();

    let mut older = sample_token();
    older.profile_id = profile_id.clone();
    older.created_at = now - TimeDelta::hours(1);

    let mut newer = sample_token();
    newer.profile_id = profile_id.clone();
    newer.created_at = now + TimeDelta::hours(1);

    let mut unrelated = sample_token();
    unrelated.profile_id = other_profile_id.clone();
    unrelated.created_at = now + TimeDelta::minutes(1);

    for token in [&older, &newer, &unrelated] {
        repo.create_token((*token).clone())
            .await
            .expect("error creating token");
    }

    let all = repo
        .get_tokens_by_profile_id(&profile_id, None, None)
        .await
        .expect("error listing tokens");
    assert_eq!(vec![newer.clone(), older.clone()], all);

    let before_now = repo
        .get_tokens_by_profile_id(&profile_id, None, Some(now))
        .await
        .expect("error listing tokens");
    assert_eq!(vec![older.clone()], before_now);

    let since_now = repo
        .get_tokens_by_profile_id(&profile_id, Some(now), None)
        .await
        .expect("error listing tokens");
    assert_eq!(vec![newer.clone()], since_now);

    let other = repo
        .get_tokens_by_profile_id(&other_profile_id, None, None)
        .await
        .expect("error listing tokens");
    assert_eq!(vec![unrelated], other);

    let none = repo
        .get_tokens_by_profile_id(&Uuid::new_v4().to_string(), None, None)
        .await
        .expect("error listing tokens");
    assert!(none.is_empty());
}
