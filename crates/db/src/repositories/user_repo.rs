//! Repository for the `users` table.

use sqlx::{PgExecutor, PgPool};
use spookify_core::types::{DbId, Timestamp};

use crate::models::token::CreateToken;
use crate::models::user::{CreateUser, User};
use crate::repositories::TokenRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, name, email, password_hash, activated, version";

/// Provides account operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new (not yet activated) user, returning the created row.
    ///
    /// A duplicate email violates `uq_users_email`.
    pub async fn create<'e, E>(executor: E, input: &CreateUser) -> Result<User, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO users (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .fetch_one(executor)
            .await
    }

    /// Insert a new user and its first token of `scope` in one transaction.
    ///
    /// Neither row is written unless both inserts succeed.
    pub async fn create_with_token(
        pool: &PgPool,
        input: &CreateUser,
        token_hash: &str,
        scope: &str,
        expiry: Timestamp,
    ) -> Result<User, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let user = Self::create(&mut *tx, input).await?;
        TokenRepo::create(
            &mut *tx,
            &CreateToken {
                hash: token_hash.to_string(),
                user_id: user.id,
                expiry,
                scope: scope.to_string(),
            },
        )
        .await?;

        tx.commit().await?;
        Ok(user)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find the owner of an unexpired token with the given digest and scope.
    pub async fn find_by_token(
        pool: &PgPool,
        token_hash: &str,
        scope: &str,
        now: Timestamp,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.created_at, u.name, u.email, u.password_hash, u.activated, u.version \
             FROM users u \
             JOIN tokens t ON t.user_id = u.id \
             WHERE t.hash = $1 AND t.scope = $2 AND t.expiry > $3",
        )
        .bind(token_hash)
        .bind(scope)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    /// Mark a user as activated, guarded by the version read earlier.
    ///
    /// Returns `None` when the row is gone or was modified concurrently
    /// (version mismatch).
    pub async fn activate(
        pool: &PgPool,
        id: DbId,
        expected_version: i32,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET activated = true, version = version + 1 \
             WHERE id = $1 AND version = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(expected_version)
            .fetch_optional(pool)
            .await
    }
}
