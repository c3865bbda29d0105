//! Repository for the `tokens` table.

use sqlx::{PgExecutor, PgPool};
use spookify_core::types::DbId;

use crate::models::token::{CreateToken, Token};

/// Stores and revokes hashed user tokens.
pub struct TokenRepo;

impl TokenRepo {
    /// Store a newly issued token.
    pub async fn create<'e, E>(executor: E, input: &CreateToken) -> Result<Token, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Token>(
            "INSERT INTO tokens (hash, user_id, expiry, scope) \
             VALUES ($1, $2, $3, $4) \
             RETURNING hash, user_id, expiry, scope",
        )
        .bind(&input.hash)
        .bind(input.user_id)
        .bind(input.expiry)
        .bind(&input.scope)
        .fetch_one(executor)
        .await
    }

    /// Delete every token of `scope` belonging to a user. Returns the number
    /// of tokens removed.
    pub async fn delete_for_user(
        pool: &PgPool,
        user_id: DbId,
        scope: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tokens WHERE user_id = $1 AND scope = $2")
            .bind(user_id)
            .bind(scope)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
