//! Repository for the `likes` join table.

use sqlx::PgPool;
use spookify_core::types::DbId;

/// Records which users like which tracks.
pub struct LikeRepo;

impl LikeRepo {
    /// Record that `user_id` likes `track_id`. Liking twice is a no-op.
    ///
    /// Returns `true` if a new like was stored.
    pub async fn like(pool: &PgPool, user_id: DbId, track_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO likes (user_id, track_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, track_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(track_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of users currently liking a track.
    pub async fn count_for_track(pool: &PgPool, track_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE track_id = $1")
            .bind(track_id)
            .fetch_one(pool)
            .await
    }
}
