//! Scoped user tokens (currently only account activation).

use sqlx::FromRow;
use spookify_core::types::{DbId, Timestamp};

/// A row from the `tokens` table. Only the digest of the token is stored.
#[derive(Debug, Clone, FromRow)]
pub struct Token {
    pub hash: String,
    pub user_id: DbId,
    pub expiry: Timestamp,
    pub scope: String,
}

/// DTO for storing a newly issued token.
#[derive(Debug, Clone)]
pub struct CreateToken {
    pub hash: String,
    pub user_id: DbId,
    pub expiry: Timestamp,
    pub scope: String,
}
