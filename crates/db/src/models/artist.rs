//! Artist entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use spookify_core::types::DbId;

/// A row from the `artists` table, as exposed alongside tracks.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Artist {
    pub id: DbId,
    pub name: String,
}

/// DTO for creating a new artist.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateArtist {
    pub name: String,
}
