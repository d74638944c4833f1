use actix_web::{HttpResponse, web};
use chrono::Utc;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ServiceError;
use crate::models::users::{CompleteProfile, UserResponse};
use crate::state::AppState;

/// GET /api/auth/me — the caller's profile with this week's quota usage.
pub async fn me(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    let used = state
        .contests
        .weekly_submission_count(user.0.id, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::new(user.0, used)))
}

/// POST /api/auth/complete-profile — set username, display name or avatar.
pub async fn complete_profile(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<CompleteProfile>,
) -> Result<HttpResponse, ServiceError> {
    let mut input = body.into_inner();

    if let Some(username) = input.username.take() {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(ServiceError::Validation("Username cannot be empty".into()));
        }
        input.username = Some(username);
    }

    let updated = state.users.complete_profile(user.0.id, input).await?;
    let used = state
        .contests
        .weekly_submission_count(updated.id, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::new(updated, used)))
}
