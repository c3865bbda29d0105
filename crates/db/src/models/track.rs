//! Track entity model, DTOs, and listing output types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use spookify_core::duration::seconds_text;
use spookify_core::types::{DbId, DurationSecs, Timestamp};

use crate::models::artist::Artist;

/// A row from the `tracks` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Track {
    pub id: DbId,
    pub created_at: Timestamp,
    pub artist_id: DbId,
    pub title: String,
    /// Rendered as `"<n> seconds"`.
    #[serde(with = "seconds_text")]
    pub duration: DurationSecs,
    pub year: i32,
    pub genres: Vec<String>,
    /// Incremented on every update.
    pub version: i32,
}

/// DTO for creating a new track. The artist has already been resolved.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTrack {
    pub artist_id: DbId,
    pub title: String,
    #[serde(with = "seconds_text")]
    pub duration: DurationSecs,
    pub year: i32,
    pub genres: Vec<String>,
}

/// DTO for patching a track. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTrack {
    pub artist_id: Option<DbId>,
    pub title: Option<String>,
    #[serde(default, with = "spookify_core::duration::option_seconds_text")]
    pub duration: Option<DurationSecs>,
    pub year: Option<i32>,
    pub genres: Option<Vec<String>>,
}

/// A track together with its artist and live like count.
///
/// `artist` is `None` only if the artist row is missing, which the foreign
/// key normally prevents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackListRow {
    pub track: Track,
    pub artist: Option<Artist>,
    pub likes: i64,
}

/// One page of a track listing plus the number of tracks matching the
/// filter across the whole table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListingResult {
    pub rows: Vec<TrackListRow>,
    pub total_matches: i64,
}
