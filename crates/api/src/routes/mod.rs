pub mod health;
pub mod tracks;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /healthcheck                 service and database health
///
/// /tracks                      list (filter, sort, paginate), create
/// /tracks/{id}                 get, update (PATCH), delete
/// /tracks/{id}/like            like (PATCH)
///
/// /users                       register
/// /users/activated             activate (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/tracks", tracks::router())
        .nest("/users", users::router())
}
