//! In-memory implementation of the token repository, for use in testing.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entities::token::{RefreshToken, RefreshTokenChange, NUM_TOKEN_RESULTS};
use crate::errors::{TokenError, TokenResult};

use super::r#trait::TokenRepository;

/// Index keys are lowercased; IDs are UUIDs, so the folding is lossless.
fn index_key(value: &str) -> String {
    value.to_ascii_lowercase()
}

#[derive(Default)]
struct Tables {
    /// Primary index: lowercased ID to record.
    tokens: HashMap<String, RefreshToken>,
    /// Secondary indices over the filterable fields.
    by_profile: HashMap<String, BTreeSet<String>>,
    by_client: HashMap<String, BTreeSet<String>>,
    by_account: HashMap<String, BTreeSet<String>>,
}

impl Tables {
    fn insert(&mut self, key: String, token: RefreshToken) {
        if !token.profile_id.is_empty() {
            self.by_profile
                .entry(index_key(&token.profile_id))
                .or_default()
                .insert(key.clone());
        }
        if !token.client_id.is_empty() {
            self.by_client
                .entry(index_key(&token.client_id))
                .or_default()
                .insert(key.clone());
        }
        if !token.account_id.is_empty() {
            self.by_account
                .entry(index_key(&token.account_id))
                .or_default()
                .insert(key.clone());
        }
        self.tokens.insert(key, token);
    }

    /// Picks the candidate set for a change from the narrowest applicable
    /// index. Candidates are still checked against every filter afterwards.
    fn candidates(&self, change: &RefreshTokenChange) -> Vec<String> {
        if !change.id.is_empty() {
            return vec![index_key(&change.id)];
        }
        let indexed = if !change.profile_id.is_empty() {
            self.by_profile.get(&index_key(&change.profile_id))
        } else if !change.client_id.is_empty() {
            self.by_client.get(&index_key(&change.client_id))
        } else {
            self.by_account.get(&index_key(&change.account_id))
        };
        indexed
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// In-memory indexed token store.
///
/// All mutations run under a single writer lock; readers take the shared
/// side and observe committed state only. That serialization is what makes
/// [`use_token`](TokenRepository::use_token) atomic: the losing callers of a
/// race re-read the used bit after the winner's write and fail fast.
pub struct MemoryTokenRepository {
    tables: RwLock<Tables>,
}

impl MemoryTokenRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemoryTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn get_token(&self, id: &str) -> TokenResult<RefreshToken> {
        let tables = self.tables.read().await;
        tables
            .tokens
            .get(&index_key(id))
            .cloned()
            .ok_or(TokenError::TokenNotFound)
    }

    async fn create_token(&self, token: RefreshToken) -> TokenResult<()> {
        let mut tables = self.tables.write().await;
        let key = index_key(&token.id);
        if tables.tokens.contains_key(&key) {
            return Err(TokenError::TokenAlreadyExists);
        }
        tables.insert(key, token);
        Ok(())
    }

    async fn update_tokens(&self, change: RefreshTokenChange) -> TokenResult<()> {
        if change.is_empty() {
            return Ok(());
        }
        if !change.has_filter() {
            return Err(TokenError::NoChangeFilter);
        }

        let mut tables = self.tables.write().await;
        for key in tables.candidates(&change) {
            let Some(token) = tables.tokens.get(&key) else {
                continue;
            };
            if !change.matches(token) {
                continue;
            }
            let updated = token.clone().apply_change(&change);
            tables.tokens.insert(key, updated);
        }
        Ok(())
    }

    async fn use_token(&self, id: &str) -> TokenResult<()> {
        let mut tables = self.tables.write().await;
        let token = tables
            .tokens
            .get_mut(&index_key(id))
            .ok_or(TokenError::TokenNotFound)?;
        if token.used {
            return Err(TokenError::TokenUsed);
        }
        token.used = true;
        Ok(())
    }

    async fn get_tokens_by_profile_id(
        &self,
        profile_id: &str,
        since: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> TokenResult<Vec<RefreshToken>> {
        let tables = self.tables.read().await;
        let mut results: Vec<RefreshToken> = tables
            .by_profile
            .get(&index_key(profile_id))
            .into_iter()
            .flatten()
            .filter_map(|key| tables.tokens.get(key))
            .filter(|token| before.map_or(true, |cutoff| token.created_at < cutoff))
            .filter(|token| since.map_or(true, |cutoff| token.created_at > cutoff))
            .cloned()
            .collect();

        results.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(NUM_TOKEN_RESULTS);
        Ok(results)
    }
}
