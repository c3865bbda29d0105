//! Handlers for account registration and activation.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use spookify_core::activation::{self, SCOPE_ACTIVATION};
use spookify_core::error::CoreError;
use spookify_core::types::{DbId, Timestamp};
use spookify_db::models::user::{CreateUser, UserResponse};
use spookify_db::repositories::{TokenRepo, UserRepo};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::mail;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 2, max = 500, message = "must be between 2 and 500 characters long"))]
    pub name: String,
    #[validate(email(message = "is not a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, max = 72, message = "must be between 8 and 72 characters long"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ActivateUserRequest {
    #[validate(length(equal = 26, message = "must be 26 characters long"))]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: DbId,
    pub created_at: Timestamp,
    pub version: i32,
}

/// POST /v1/users
///
/// Create an inactive account and issue an activation token. Both rows are
/// written in one transaction. The token is emailed from a background task
/// when SMTP is configured.
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RegisterUserRequest>,
) -> AppResult<impl IntoResponse> {
    let password_hash =
        hash_password(&input.password).map_err(|e| AppError::InternalError(e.to_string()))?;

    let token = activation::generate_token();
    let user = UserRepo::create_with_token(
        &state.pool,
        &CreateUser {
            name: input.name,
            email: input.email,
            password_hash,
        },
        &token.hash,
        SCOPE_ACTIVATION,
        activation::expires_at(Utc::now(), state.config.activation_token_ttl_hours),
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    match &state.mailer {
        Some(mailer) => mail::spawn_activation_email(
            Arc::clone(mailer),
            user.email.clone(),
            user.name.clone(),
            user.id,
            token.plaintext,
        ),
        None => tracing::debug!(user_id = user.id, "SMTP not configured, skipping activation email"),
    }

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: RegisteredUser {
                id: user.id,
                created_at: user.created_at,
                version: user.version,
            },
        }),
    ))
}

/// PUT /v1/users/activated
///
/// Exchange an activation token for an activated account. The user's
/// activation tokens are removed afterwards.
pub async fn activate_user(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ActivateUserRequest>,
) -> AppResult<impl IntoResponse> {
    let token_hash = activation::hash_token(&input.token);

    let user = UserRepo::find_by_token(&state.pool, &token_hash, SCOPE_ACTIVATION, Utc::now())
        .await?
        .ok_or(AppError::Core(CoreError::InvalidToken))?;

    let user = UserRepo::activate(&state.pool, user.id, user.version)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(
                "unable to update the record due to an edit conflict, please try again".into(),
            )
        })?;

    TokenRepo::delete_for_user(&state.pool, user.id, SCOPE_ACTIVATION).await?;

    tracing::info!(user_id = user.id, "User activated");

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}
