//! Token repository trait defining the interface for refresh token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::{RefreshToken, RefreshTokenChange};
use crate::errors::TokenResult;

/// Storage contract for [`RefreshToken`] records.
///
/// Two implementations exist: an in-memory store for testing and a
/// PostgreSQL store for production. Both must satisfy the same observable
/// contract, and [`super::conformance`] holds the shared assertions.
///
/// Cancellation follows tokio semantics: dropping a returned future aborts
/// the in-flight operation.
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Retrieve the token with an ID matching `id`.
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The stored record
    /// * `Err(TokenError::TokenNotFound)` - No record has that ID
    async fn get_token(&self, id: &str) -> TokenResult<RefreshToken>;

    /// Insert `token` into the store.
    ///
    /// The insert is all-or-nothing: when a record with the same ID already
    /// exists, `TokenError::TokenAlreadyExists` is returned and the stored
    /// record is left untouched.
    async fn create_token(&self, token: RefreshToken) -> TokenResult<()>;

    /// Apply `change` to every record matched by the conjunction of its
    /// non-empty filter fields.
    ///
    /// An empty change succeeds without effect. A change that carries
    /// mutations but no filter fails with `TokenError::NoChangeFilter`.
    /// Records missing from the match set are not an error.
    async fn update_tokens(&self, change: RefreshTokenChange) -> TokenResult<()>;

    /// Atomically mark the token specified by `id` as used.
    ///
    /// Under concurrent presentation of the same ID, exactly one caller
    /// succeeds; every other caller observes `TokenError::TokenUsed`.
    ///
    /// # Returns
    /// * `Ok(())` - This caller consumed the token
    /// * `Err(TokenError::TokenUsed)` - The token was already consumed
    /// * `Err(TokenError::TokenNotFound)` - No record has that ID
    async fn use_token(&self, id: &str) -> TokenResult<()>;

    /// Retrieve up to [`NUM_TOKEN_RESULTS`](crate::domain::entities::token::NUM_TOKEN_RESULTS)
    /// tokens belonging to `profile_id`, most recently created first, ties
    /// broken by ID so pagination is deterministic.
    ///
    /// When `since` is set, only records created strictly after it are
    /// returned; when `before` is set, only records created strictly before
    /// it. Callers page through larger result sets by passing the oldest
    /// `created_at` of the previous page as the next `before`.
    async fn get_tokens_by_profile_id(
        &self,
        profile_id: &str,
        since: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> TokenResult<Vec<RefreshToken>>;
}
