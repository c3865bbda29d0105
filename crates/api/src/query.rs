//! Query string parameters for the track listing endpoint.

use serde::Deserialize;
use spookify_core::listing::{
    split_genres, ListingParams, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT,
};

/// `GET /tracks?title=&artist=&genres=&sort=&page=&page_size=`
///
/// Everything arrives as text. `page` and `page_size` fall back to their
/// defaults when missing or not an integer; range checks happen when the
/// listing request is validated.
#[derive(Debug, Default, Deserialize)]
pub struct ListTracksQuery {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Comma-separated genre tags.
    pub genres: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListTracksQuery {
    pub fn into_params(self) -> ListingParams {
        ListingParams {
            title: self.title.unwrap_or_default(),
            artist: self.artist.unwrap_or_default(),
            genres: self.genres.as_deref().map(split_genres).unwrap_or_default(),
            sort: self
                .sort
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SORT.to_string()),
            page: read_int(self.page.as_deref(), DEFAULT_PAGE),
            page_size: read_int(self.page_size.as_deref(), DEFAULT_PAGE_SIZE),
        }
    }
}

fn read_int(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
