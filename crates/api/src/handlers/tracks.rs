//! Handlers for the track catalog.
//!
//! Provides the filtered, paginated listing plus single-track CRUD and likes.
//! Artists are referenced by exact name in request bodies and resolved to an
//! id before anything is written.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use spookify_core::duration::{option_seconds_text, seconds_text};
use spookify_core::error::CoreError;
use spookify_core::listing::{ListingRequest, PageMetadata};
use spookify_core::types::{DbId, DurationSecs, Timestamp};
use spookify_db::models::track::{CreateTrack, UpdateTrack};
use spookify_db::repositories::{ArtistRepo, LikeRepo, TrackRepo, UserRepo};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, ValidatedJson};
use crate::query::ListTracksQuery;
use crate::response::{DataResponse, MessageResponse, PageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct ArtistRef {
    #[validate(length(min = 1, message = "must be provided"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTrackRequest {
    #[validate(nested)]
    pub artist: ArtistRef,
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 characters long"))]
    pub title: String,
    #[serde(with = "seconds_text")]
    pub duration: DurationSecs,
    #[validate(range(min = 1900, max = 2024, message = "must be between 1900 and 2024"))]
    pub year: i32,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTrackRequest {
    #[validate(nested)]
    pub artist: Option<ArtistRef>,
    #[validate(length(min = 1, max = 500, message = "must be between 1 and 500 characters long"))]
    pub title: Option<String>,
    #[serde(default, with = "option_seconds_text")]
    pub duration: Option<DurationSecs>,
    #[validate(range(min = 1900, max = 2024, message = "must be between 1900 and 2024"))]
    pub year: Option<i32>,
    pub genres: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LikeTrackRequest {
    pub user_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct CreatedTrack {
    pub id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct TrackLikes {
    pub track_id: DbId,
    pub likes: i64,
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// GET /v1/tracks
///
/// Filter by `title`, `artist`, and comma-separated `genres`; order by an
/// allow-listed `sort` key; paginate with `page` / `page_size`.
pub async fn list_tracks(
    State(state): State<AppState>,
    Query(query): Query<ListTracksQuery>,
) -> AppResult<impl IntoResponse> {
    let request = ListingRequest::from_params(&query.into_params())?;
    let result = TrackRepo::list(&state.pool, &request, state.config.listing_timeout()).await?;

    let metadata = PageMetadata::new(request.pagination(), result.total_matches);
    let message = format!(
        "{} of {} tracks, page {} of {}",
        result.rows.len(),
        metadata.total_records,
        metadata.current_page,
        metadata.last_page,
    );

    Ok(Json(PageResponse {
        message,
        metadata,
        data: result.rows,
    }))
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /v1/tracks/{id}
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let track = TrackRepo::find_with_details(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Track", id }))?;

    Ok(Json(DataResponse { data: track }))
}

/// POST /v1/tracks
pub async fn create_track(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateTrackRequest>,
) -> AppResult<impl IntoResponse> {
    let artist_id = resolve_artist(&state.pool, &input.artist.name).await?;

    let track = TrackRepo::create(
        &state.pool,
        &CreateTrack {
            artist_id,
            title: input.title,
            duration: input.duration,
            year: input.year,
            genres: input.genres,
        },
    )
    .await?;

    tracing::info!(track_id = track.id, artist_id, "Track created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedTrack {
                id: track.id,
                created_at: track.created_at,
            },
        }),
    ))
}

/// PATCH /v1/tracks/{id}
pub async fn update_track(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTrackRequest>,
) -> AppResult<impl IntoResponse> {
    let artist_id = match &input.artist {
        Some(artist) => Some(resolve_artist(&state.pool, &artist.name).await?),
        None => None,
    };

    let update = UpdateTrack {
        artist_id,
        title: input.title,
        duration: input.duration,
        year: input.year,
        genres: input.genres,
    };
    let track = TrackRepo::update(&state.pool, id, &update)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Track", id }))?;

    tracing::info!(track_id = id, version = track.version, "Track updated");

    let details = TrackRepo::find_with_details(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Track", id }))?;

    Ok(Json(DataResponse { data: details }))
}

/// DELETE /v1/tracks/{id}
pub async fn delete_track(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TrackRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Track", id }));
    }

    tracing::info!(track_id = id, "Track deleted");

    Ok(Json(MessageResponse {
        message: format!("track {id} successfully deleted"),
    }))
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

/// PATCH /v1/tracks/{id}/like
///
/// Record that a user likes a track. Liking twice is a no-op.
pub async fn like_track(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<LikeTrackRequest>,
) -> AppResult<impl IntoResponse> {
    TrackRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Track", id }))?;
    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let added = LikeRepo::like(&state.pool, input.user_id, id).await?;
    let likes = LikeRepo::count_for_track(&state.pool, id).await?;

    tracing::info!(track_id = id, user_id = input.user_id, added, likes, "Track liked");

    Ok(Json(DataResponse {
        data: TrackLikes { track_id: id, likes },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn resolve_artist(pool: &PgPool, name: &str) -> AppResult<DbId> {
    let artist = ArtistRepo::find_by_name(pool, name)
        .await?
        .ok_or_else(|| CoreError::NotFoundByKey {
            entity: "Artist",
            key: name.to_string(),
        })?;
    Ok(artist.id)
}
