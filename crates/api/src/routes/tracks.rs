use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::tracks;
use crate::state::AppState;

/// Routes mounted at `/tracks`.
///
/// ```text
/// GET    /             list_tracks
/// POST   /             create_track
/// GET    /{id}         get_track
/// PATCH  /{id}         update_track
/// DELETE /{id}         delete_track
/// PATCH  /{id}/like    like_track
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tracks::list_tracks).post(tracks::create_track))
        .route(
            "/{id}",
            get(tracks::get_track)
                .patch(tracks::update_track)
                .delete(tracks::delete_track),
        )
        .route("/{id}/like", patch(tracks::like_track))
}
