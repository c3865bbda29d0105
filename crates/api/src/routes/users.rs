use axum::routing::{post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// POST /              register_user
/// PUT  /activated     activate_user
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register_user))
        .route("/activated", put(users::activate_user))
}
