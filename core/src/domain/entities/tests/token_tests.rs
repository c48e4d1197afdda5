//! Tests for the refresh-token record and patch types.

use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::entities::token::{RefreshToken, RefreshTokenChange};

fn sample_token() -> RefreshToken {
    RefreshToken {
        id: "9f3c6a1e-8e5f-4f43-a9c8-7a2f5d1b03a1".to_string(),
        created_at: Utc::now() - TimeDelta::hours(1),
        created_from: "web".to_string(),
        scopes: vec!["read".to_string(), "write".to_string()],
        profile_id: "p1".to_string(),
        client_id: "c1".to_string(),
        account_id: "a1".to_string(),
        revoked: false,
        used: false,
    }
}

#[test]
fn test_fill_defaults_sets_id_and_created_at() {
    let token = RefreshToken {
        created_from: "web".to_string(),
        profile_id: "p1".to_string(),
        client_id: "c1".to_string(),
        ..Default::default()
    };

    let filled = token.fill_defaults();

    assert!(!filled.id.is_empty());
    assert!(uuid::Uuid::parse_str(&filled.id).is_ok());
    assert_ne!(filled.created_at, DateTime::<Utc>::UNIX_EPOCH);
    assert!(filled.created_at <= Utc::now());
}

#[test]
fn test_fill_defaults_preserves_existing_values() {
    let token = sample_token();
    let filled = token.clone().fill_defaults();

    assert_eq!(token, filled);
}

#[test]
fn test_fill_defaults_generates_distinct_ids() {
    let first = RefreshToken::default().fill_defaults();
    let second = RefreshToken::default().fill_defaults();

    assert_ne!(first.id, second.id);
}

#[test]
fn test_apply_empty_change_is_identity() {
    let token = sample_token();
    let change = RefreshTokenChange::default();

    assert_eq!(token.clone(), token.apply_change(&change));
}

#[test]
fn test_apply_change_is_idempotent() {
    let token = sample_token();
    let change = RefreshTokenChange {
        revoked: Some(true),
        used: Some(true),
        ..Default::default()
    };

    let once = token.apply_change(&change);
    let twice = once.clone().apply_change(&change);

    assert_eq!(once, twice);
}

#[test]
fn test_apply_change_touches_only_requested_fields() {
    let token = sample_token();

    let revoked_only = token.clone().apply_change(&RefreshTokenChange {
        revoked: Some(true),
        ..Default::default()
    });
    assert!(revoked_only.revoked);
    assert!(!revoked_only.used);

    let used_only = token.clone().apply_change(&RefreshTokenChange {
        used: Some(true),
        ..Default::default()
    });
    assert!(!used_only.revoked);
    assert!(used_only.used);

    let both = token.apply_change(&RefreshTokenChange {
        revoked: Some(true),
        used: Some(true),
        ..Default::default()
    });
    assert!(both.revoked);
    assert!(both.used);
}

#[test]
fn test_apply_change_can_clear_flags() {
    let mut token = sample_token();
    token.revoked = true;
    token.used = true;

    let cleared = token.apply_change(&RefreshTokenChange {
        revoked: Some(false),
        used: Some(false),
        ..Default::default()
    });

    assert!(!cleared.revoked);
    assert!(!cleared.used);
}

#[test]
fn test_change_is_empty() {
    assert!(RefreshTokenChange::default().is_empty());
    assert!(RefreshTokenChange {
        id: "some-id".to_string(),
        ..Default::default()
    }
    .is_empty());
    assert!(!RefreshTokenChange {
        revoked: Some(false),
        ..Default::default()
    }
    .is_empty());
    assert!(!RefreshTokenChange {
        used: Some(true),
        ..Default::default()
    }
    .is_empty());
}

#[test]
fn test_change_has_filter() {
    assert!(!RefreshTokenChange::default().has_filter());

    for change in [
        RefreshTokenChange {
            id: "t1".to_string(),
            ..Default::default()
        },
        RefreshTokenChange {
            profile_id: "p1".to_string(),
            ..Default::default()
        },
        RefreshTokenChange {
            client_id: "c1".to_string(),
            ..Default::default()
        },
        RefreshTokenChange {
            account_id: "a1".to_string(),
            ..Default::default()
        },
    ] {
        assert!(change.has_filter(), "expected filter for {change:?}");
    }
}

#[test]
fn test_change_matches_is_conjunctive() {
    let token = sample_token();

    let matching = RefreshTokenChange {
        profile_id: "p1".to_string(),
        client_id: "c1".to_string(),
        ..Default::default()
    };
    assert!(matching.matches(&token));

    let partly_matching = RefreshTokenChange {
        profile_id: "p1".to_string(),
        client_id: "other-client".to_string(),
        ..Default::default()
    };
    assert!(!partly_matching.matches(&token));

    // no filters at all matches everything
    assert!(RefreshTokenChange::default().matches(&token));
}

#[test]
fn test_token_serialization_round_trip() {
    let token = sample_token();

    let json = serde_json::to_string(&token).unwrap();
    let deserialized: RefreshToken = serde_json::from_str(&json).unwrap();

    assert_eq!(token, deserialized);
    assert_eq!(token.scopes, deserialized.scopes);
}
