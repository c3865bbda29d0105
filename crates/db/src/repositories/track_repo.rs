//! Repository for the `tracks` table, including the track listing engine.
//!
//! The listing query composes optional full-text, artist, and genre
//! predicates, an allow-listed ordering with an `id` tiebreak, and the
//! total match count into a single statement. PostgreSQL evaluates a
//! statement against one snapshot, so the page rows, their like counts,
//! and the total always agree with each other even under concurrent writes.

use std::time::Duration;

use sqlx::{PgPool, Postgres, QueryBuilder};
use spookify_core::listing::{
    ListingError, ListingParams, ListingRequest, Sort, StorageFailure,
};
use spookify_core::types::{DbId, DurationSecs, Timestamp};

use crate::models::artist::Artist;
use crate::models::track::{CreateTrack, ListingResult, Track, TrackListRow, UpdateTrack};

/// Column list shared across single-table queries.
const COLUMNS: &str = "id, created_at, artist_id, title, duration, year, genres, version";

/// Provides CRUD operations and the filtered listing for tracks.
pub struct TrackRepo;

impl TrackRepo {
    /// Insert a new track, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateTrack) -> Result<Track, sqlx::Error> {
        let query = format!(
            "INSERT INTO tracks (artist_id, title, duration, year, genres) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(input.artist_id)
            .bind(&input.title)
            .bind(input.duration)
            .bind(input.year)
            .bind(&input.genres)
            .fetch_one(pool)
            .await
    }

    /// Find a track by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Track>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tracks WHERE id = $1");
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a track with its artist and current like count.
    pub async fn find_with_details(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TrackListRow>, sqlx::Error> {
        let row = sqlx::query_as::<_, DetailRow>(
            "SELECT t.id, t.created_at, t.artist_id, t.title, t.duration, t.year, \
                    t.genres, t.version, \
                    a.id AS artist_ref, a.name AS artist_name, \
                    (SELECT COUNT(*) FROM likes l WHERE l.track_id = t.id) AS likes_count \
             FROM tracks t \
             LEFT JOIN artists a ON a.id = t.artist_id \
             WHERE t.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(DetailRow::into_list_row))
    }

    /// Update a track. Only non-`None` fields are applied; `version` is
    /// always incremented.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrack,
    ) -> Result<Option<Track>, sqlx::Error> {
        let query = format!(
            "UPDATE tracks SET \
                artist_id = COALESCE($2, artist_id), \
                title = COALESCE($3, title), \
                duration = COALESCE($4, duration), \
                year = COALESCE($5, year), \
                genres = COALESCE($6, genres), \
                version = version + 1 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Track>(&query)
            .bind(id)
            .bind(input.artist_id)
            .bind(&input.title)
            .bind(input.duration)
            .bind(input.year)
            .bind(&input.genres)
            .fetch_optional(pool)
            .await
    }

    /// Delete a track. Likes referencing it cascade.
    ///
    /// Returns `false` if no row with the given `id` existed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    /// Validate raw listing parameters, then run [`TrackRepo::list`].
    ///
    /// Invalid pagination or an unsafe sort key is rejected before any
    /// connection is acquired.
    pub async fn list_with_params(
        pool: &PgPool,
        params: &ListingParams,
        deadline: Duration,
    ) -> Result<ListingResult, ListingError> {
        let request = ListingRequest::from_params(params)?;
        Self::list(pool, &request, deadline).await
    }

    /// Fetch one page of tracks matching `request`, with the total number of
    /// matches across the whole table.
    ///
    /// The statement must complete within `deadline`; otherwise the call
    /// fails with [`StorageFailure::Timeout`]. Any driver error or
    /// undecodable row fails the whole call with [`StorageFailure::Query`].
    pub async fn list(
        pool: &PgPool,
        request: &ListingRequest,
        deadline: Duration,
    ) -> Result<ListingResult, ListingError> {
        let mut query = build_listing_query(request);
        let fetch = query.build_query_as::<ListingRow>().fetch_all(pool);

        let rows = match tokio::time::timeout(deadline, fetch).await {
            Ok(Ok(rows)) => rows,
            Ok(Err(err)) => return Err(query_failure(err)),
            Err(_) => {
                tracing::warn!(
                    deadline_ms = deadline.as_millis() as u64,
                    sort = %request.sort().key(),
                    page = request.pagination().page(),
                    "Track listing query timed out"
                );
                return Err(StorageFailure::Timeout(deadline).into());
            }
        };

        let total_matches = rows.first().map_or(0, |row| row.total_count);
        let rows = rows
            .into_iter()
            .filter_map(|row| row.into_list_row().transpose())
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_failure)?;

        tracing::debug!(
            title = request.title(),
            artist = request.artist(),
            genres = ?request.genres(),
            sort = %request.sort().key(),
            page = request.pagination().page(),
            page_size = request.pagination().page_size(),
            returned = rows.len(),
            total_matches,
            "Track listing fetched"
        );

        Ok(ListingResult {
            rows,
            total_matches,
        })
    }
}

fn query_failure(err: sqlx::Error) -> ListingError {
    StorageFailure::Query(Box::new(err)).into()
}

// ---------------------------------------------------------------------------
// Query construction
// ---------------------------------------------------------------------------

/// `ORDER BY` body for a validated sort, qualified with `alias`.
///
/// Only the enum-resolved column identifier and direction keyword are
/// interpolated; the `id ASC` tiebreak gives a total order so that
/// consecutive pages never overlap or skip rows.
fn order_by(sort: Sort, alias: &str) -> String {
    format!(
        "{alias}.{column} {direction}, {alias}.id ASC",
        column = sort.column.column(),
        direction = sort.direction.as_sql(),
    )
}

/// Build the single listing statement.
///
/// Shape:
///
/// ```text
/// WITH matched AS (tracks ⟕ artists WHERE <active predicates>),
///      page    AS (matched + like count, ORDER BY .. LIMIT .. OFFSET ..)
/// SELECT total.total_count, page.*
/// FROM (SELECT COUNT(*) FROM matched) total LEFT JOIN page ON TRUE
/// ```
///
/// The outer left join always yields at least one row, so a page past the
/// end still reports the true total (with all track columns NULL).
pub(crate) fn build_listing_query(request: &ListingRequest) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::<Postgres>::new(
        "WITH matched AS (\
            SELECT t.id, t.created_at, t.artist_id, t.title, t.duration, t.year, \
                   t.genres, t.version, \
                   a.id AS artist_ref, a.name AS artist_name \
            FROM tracks t \
            LEFT JOIN artists a ON a.id = t.artist_id \
            WHERE TRUE",
    );

    if let Some(title) = request.title() {
        qb.push(" AND to_tsvector('simple', t.title) @@ plainto_tsquery('simple', ");
        qb.push_bind(title.to_string());
        qb.push(")");
    }

    if let Some(artist) = request.artist() {
        qb.push(" AND to_tsvector('simple', a.name) @@ plainto_tsquery('simple', ");
        qb.push_bind(artist.to_string());
        qb.push(")");
    }

    if let Some(genres) = request.genres() {
        qb.push(" AND t.genres @> ");
        qb.push_bind(genres.to_vec());
        qb.push("::TEXT[]");
    }

    let sort = request.sort();
    let pagination = request.pagination();

    qb.push(
        "), page AS (\
            SELECT m.*, \
                   (SELECT COUNT(*) FROM likes l WHERE l.track_id = m.id) AS likes_count \
            FROM matched m \
            ORDER BY ",
    );
    qb.push(order_by(sort, "m"));
    qb.push(" LIMIT ");
    qb.push_bind(pagination.limit());
    qb.push(" OFFSET ");
    qb.push_bind(pagination.offset());
    qb.push(
        ") SELECT total.total_count, page.* \
         FROM (SELECT COUNT(*) AS total_count FROM matched) total \
         LEFT JOIN page ON TRUE \
         ORDER BY ",
    );
    qb.push(order_by(sort, "page"));

    qb
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

/// Single-track projection used by [`TrackRepo::find_with_details`].
#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    track: Track,
    artist_ref: Option<DbId>,
    artist_name: Option<String>,
    likes_count: i64,
}

impl DetailRow {
    fn into_list_row(self) -> TrackListRow {
        TrackListRow {
            track: self.track,
            artist: join_artist(self.artist_ref, self.artist_name),
            likes: self.likes_count,
        }
    }
}

/// Listing projection. Track columns are nullable because an empty page
/// still yields one row carrying `total_count`.
#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    total_count: i64,
    id: Option<DbId>,
    created_at: Option<Timestamp>,
    artist_id: Option<DbId>,
    title: Option<String>,
    duration: Option<DurationSecs>,
    year: Option<i32>,
    genres: Option<Vec<String>>,
    version: Option<i32>,
    artist_ref: Option<DbId>,
    artist_name: Option<String>,
    likes_count: Option<i64>,
}

impl ListingRow {
    /// `Ok(None)` for the empty-page row, an error if a matched row is
    /// missing a NOT NULL column.
    fn into_list_row(self) -> Result<Option<TrackListRow>, sqlx::Error> {
        let Some(id) = self.id else {
            return Ok(None);
        };

        let track = Track {
            id,
            created_at: required(self.created_at, "created_at")?,
            artist_id: required(self.artist_id, "artist_id")?,
            title: required(self.title, "title")?,
            duration: required(self.duration, "duration")?,
            year: required(self.year, "year")?,
            genres: required(self.genres, "genres")?,
            version: required(self.version, "version")?,
        };

        Ok(Some(TrackListRow {
            track,
            artist: join_artist(self.artist_ref, self.artist_name),
            likes: self.likes_count.unwrap_or(0),
        }))
    }
}

fn required<T>(value: Option<T>, column: &str) -> Result<T, sqlx::Error> {
    value.ok_or_else(|| sqlx::Error::Decode(format!("listing row has NULL {column}").into()))
}

fn join_artist(id: Option<DbId>, name: Option<String>) -> Option<Artist> {
    match (id, name) {
        (Some(id), Some(name)) => Some(Artist { id, name }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sql_for(params: ListingParams) -> String {
        let request = ListingRequest::from_params(&params).unwrap();
        build_listing_query(&request).sql().to_string()
    }

    #[test]
    fn no_filters_adds_no_predicates() {
        let sql = sql_for(ListingParams::default());
        assert!(!sql.contains("plainto_tsquery"));
        assert!(!sql.contains("@>"));
        assert!(sql.contains("ORDER BY m.id ASC, m.id ASC"));
        assert!(sql.contains("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn filters_are_bound_not_interpolated() {
        let sql = sql_for(ListingParams {
            title: "x'); DROP TABLE tracks; --".into(),
            artist: "Robert'); --".into(),
            genres: vec!["rock'".into()],
            ..ListingParams::default()
        });
        assert!(!sql.contains("DROP TABLE"));
        assert!(!sql.contains("Robert"));
        assert!(!sql.contains("rock'"));
        assert!(sql.contains("plainto_tsquery('simple', $1)"));
        assert!(sql.contains("plainto_tsquery('simple', $2)"));
        assert!(sql.contains("t.genres @> $3::TEXT[]"));
        assert!(sql.contains("LIMIT $4 OFFSET $5"));
    }

    #[test]
    fn descending_sort_keeps_ascending_id_tiebreak() {
        let sql = sql_for(ListingParams {
            sort: "-year".into(),
            ..ListingParams::default()
        });
        assert!(sql.contains("ORDER BY m.year DESC, m.id ASC"));
        assert!(sql.ends_with("ORDER BY page.year DESC, page.id ASC"));
    }

    #[test]
    fn count_and_page_share_one_statement() {
        let sql = sql_for(ListingParams::default());
        assert!(sql.starts_with("WITH matched AS ("));
        assert!(sql.contains("SELECT COUNT(*) AS total_count FROM matched"));
        assert!(sql.contains("LEFT JOIN page ON TRUE"));
    }

    #[test]
    fn empty_page_row_decodes_to_nothing() {
        let row = ListingRow {
            total_count: 7,
            id: None,
            created_at: None,
            artist_id: None,
            title: None,
            duration: None,
            year: None,
            genres: None,
            version: None,
            artist_ref: None,
            artist_name: None,
            likes_count: None,
        };
        assert!(row.into_list_row().unwrap().is_none());
    }

    #[test]
    fn matched_row_with_null_column_is_an_error() {
        let row = ListingRow {
            total_count: 1,
            id: Some(1),
            created_at: Some(chrono::Utc::now()),
            artist_id: Some(1),
            title: None,
            duration: Some(10),
            year: Some(2001),
            genres: Some(vec![]),
            version: Some(1),
            artist_ref: Some(1),
            artist_name: Some("A".into()),
            likes_count: Some(0),
        };
        assert!(matches!(row.into_list_row(), Err(sqlx::Error::Decode(_))));
    }

    #[test]
    fn missing_artist_yields_none() {
        assert_eq!(join_artist(None, None), None);
        assert_eq!(
            join_artist(Some(3), Some("Nova".into())),
            Some(Artist {
                id: 3,
                name: "Nova".into()
            })
        );
    }
}
