//! Repository for the `artists` table.

use sqlx::PgPool;
use spookify_core::types::DbId;

use crate::models::artist::{Artist, CreateArtist};

/// Provides lookups and inserts for artists.
pub struct ArtistRepo;

impl ArtistRepo {
    /// Insert a new artist, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateArtist) -> Result<Artist, sqlx::Error> {
        sqlx::query_as::<_, Artist>("INSERT INTO artists (name) VALUES ($1) RETURNING id, name")
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Artist>, sqlx::Error> {
        sqlx::query_as::<_, Artist>("SELECT id, name FROM artists WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an artist by exact (case-sensitive) name.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Artist>, sqlx::Error> {
        sqlx::query_as::<_, Artist>("SELECT id, name FROM artists WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
