use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::authorization::require_self_or_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::error::ServiceError;
use crate::models::users::{PublicUser, WeeklySubmissions};
use crate::service::QUOTA_WINDOW_DAYS;
use crate::state::AppState;

/// GET /api/users/{id} — public profile, never includes email or quota.
pub async fn get_user(
    _user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let user = state
        .users
        .find_user(path.into_inner())
        .await?
        .ok_or(ServiceError::UserNotFound)?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// GET /api/users/{id}/submissions/weekly
pub async fn weekly_submissions(
    auth_user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = path.into_inner();
    require_self_or_admin(&auth_user.0, user_id)?;

    let count = state
        .contests
        .weekly_submission_count(user_id, Utc::now())
        .await?;

    Ok(HttpResponse::Ok().json(WeeklySubmissions {
        user_id,
        count,
        window_days: QUOTA_WINDOW_DAYS,
    }))
}
