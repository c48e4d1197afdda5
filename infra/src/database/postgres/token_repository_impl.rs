//! PostgreSQL implementation of the token repository.
//!
//! Records live in the `refresh_tokens` table (see `schema.sql`). The
//! single-use guarantee rides on a conditional UPDATE: the row count is the
//! authoritative signal, and a follow-up probe only classifies the failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};

use tokens_core::domain::entities::token::{
    RefreshToken, RefreshTokenChange, NUM_TOKEN_RESULTS,
};
use tokens_core::errors::{TokenError, TokenResult};
use tokens_core::repositories::token::r#trait::TokenRepository;

/// Name Postgres assigns to the primary-key constraint on `refresh_tokens`.
const PKEY_CONSTRAINT: &str = "refresh_tokens_pkey";

const TOKEN_COLUMNS: &str =
    "id, created_at, created_from, scopes, profile_id, client_id, account_id, revoked, used";

/// PostgreSQL-backed token repository.
pub struct PostgresTokenRepository {
    /// Database connection pool
    pool: PgPool,
}

impl PostgresTokenRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a [`RefreshToken`].
    fn row_to_token(row: &PgRow) -> TokenResult<RefreshToken> {
        Ok(RefreshToken {
            id: row.try_get("id").map_err(TokenError::storage)?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(TokenError::storage)?,
            created_from: row.try_get("created_from").map_err(TokenError::storage)?,
            scopes: row
                .try_get::<Vec<String>, _>("scopes")
                .map_err(TokenError::storage)?,
            profile_id: row.try_get("profile_id").map_err(TokenError::storage)?,
            client_id: row.try_get("client_id").map_err(TokenError::storage)?,
            account_id: row.try_get("account_id").map_err(TokenError::storage)?,
            revoked: row.try_get("revoked").map_err(TokenError::storage)?,
            used: row.try_get("used").map_err(TokenError::storage)?,
        })
    }
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn get_token(&self, id: &str) -> TokenResult<RefreshToken> {
        let query = format!("SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(TokenError::storage)?
            .ok_or(TokenError::TokenNotFound)?;

        Self::row_to_token(&row)
    }

    async fn create_token(&self, token: RefreshToken) -> TokenResult<()> {
        let query = format!(
            "INSERT INTO refresh_tokens ({TOKEN_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        );
        sqlx::query(&query)
            .bind(&token.id)
            .bind(token.created_at)
            .bind(&token.created_from)
            .bind(&token.scopes)
            .bind(&token.profile_id)
            .bind(&token.client_id)
            .bind(&token.account_id)
            .bind(token.revoked)
            .bind(token.used)
            .execute(&self.pool)
            .await
            .map_err(|err| match &err {
                sqlx::Error::Database(db) if db.constraint() == Some(PKEY_CONSTRAINT) => {
                    TokenError::TokenAlreadyExists
                }
                _ => TokenError::storage(err),
            })?;

        Ok(())
    }

    async fn update_tokens(&self, change: RefreshTokenChange) -> TokenResult<()> {
        if change.is_empty() {
            return Ok(());
        }
        if !change.has_filter() {
            return Err(TokenError::NoChangeFilter);
        }

        // one UPDATE: SET from the present mutations, WHERE from the AND of
        // the non-empty filters
        let mut query = QueryBuilder::new("UPDATE refresh_tokens SET ");
        let mut sets = query.separated(", ");
        if let Some(revoked) = change.revoked {
            sets.push("revoked = ").push_bind_unseparated(revoked);
        }
        if let Some(used) = change.used {
            sets.push("used = ").push_bind_unseparated(used);
        }

        query.push(" WHERE ");
        let mut filters = query.separated(" AND ");
        if !change.id.is_empty() {
            filters.push("id = ").push_bind_unseparated(change.id.clone());
        }
        if !change.profile_id.is_empty() {
            filters
                .push("profile_id = ")
                .push_bind_unseparated(change.profile_id.clone());
        }
        if !change.client_id.is_empty() {
            filters
                .push("client_id = ")
                .push_bind_unseparated(change.client_id.clone());
        }
        if !change.account_id.is_empty() {
            filters
                .push("account_id = ")
                .push_bind_unseparated(change.account_id.clone());
        }

        query
            .build()
            .execute(&self.pool)
            .await
            .map_err(TokenError::storage)?;
        Ok(())
    }

    async fn use_token(&self, id: &str) -> TokenResult<()> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET used = TRUE WHERE id = $1 AND used = FALSE",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(TokenError::storage)?;

        if result.rows_affected() >= 1 {
            return Ok(());
        }

        // the conditional UPDATE is the atomicity primitive; this probe only
        // tells an already-used token apart from a missing one
        let already_used: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM refresh_tokens WHERE id = $1 AND used = TRUE",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(TokenError::storage)?;

        if already_used >= 1 {
            Err(TokenError::TokenUsed)
        } else {
            Err(TokenError::TokenNotFound)
        }
    }

    async fn get_tokens_by_profile_id(
        &self,
        profile_id: &str,
        since: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> TokenResult<Vec<RefreshToken>> {
        let mut query = QueryBuilder::new(format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE profile_id = "
        ));
        query.push_bind(profile_id.to_string());
        if let Some(before) = before {
            query.push(" AND created_at < ").push_bind(before);
        }
        if let Some(since) = since {
            query.push(" AND created_at > ").push_bind(since);
        }
        query
            .push(" ORDER BY created_at DESC, id LIMIT ")
            .push_bind(NUM_TOKEN_RESULTS as i64);

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(TokenError::storage)?;

        rows.iter().map(Self::row_to_token).collect()
    }
}
