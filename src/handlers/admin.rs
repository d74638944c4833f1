use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::authorization::require_admin;
use crate::auth::middleware::AuthenticatedUser;
use crate::error::ServiceError;
use crate::models::contests::{ContestResponse, CreateContest, UpdateContestStatus};
use crate::models::photos::ModeratePhoto;
use crate::models::users::{PublicUser, UpdateMembership};
use crate::state::AppState;

/// POST /api/admin/contests
pub async fn create_contest(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    body: web::Json<CreateContest>,
) -> Result<HttpResponse, ServiceError> {
    require_admin(&user.0)?;

    let contest = state
        .contests
        .create_contest(user.0.id, body.into_inner())
        .await?;
    state.cache.invalidate_contests();

    Ok(HttpResponse::Created().json(ContestResponse::from(contest)))
}

/// PUT /api/admin/contests/{id}/status
pub async fn set_contest_status(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateContestStatus>,
) -> Result<HttpResponse, ServiceError> {
    require_admin(&user.0)?;

    let contest = state
        .contests
        .set_contest_status(path.into_inner(), body.status)
        .await?;
    state.cache.invalidate_contests();

    Ok(HttpResponse::Ok().json(ContestResponse::from(contest)))
}

/// POST /api/admin/contests/advance — run the phase scheduler once, now.
pub async fn advance_phases(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ServiceError> {
    require_admin(&user.0)?;

    let transitions = state.contests.advance_phases(Utc::now()).await?;
    if !transitions.is_empty() {
        state.cache.invalidate_contests();
    }

    Ok(HttpResponse::Ok().json(transitions))
}

/// PUT /api/admin/photos/{id}/moderation
pub async fn moderate_photo(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<ModeratePhoto>,
) -> Result<HttpResponse, ServiceError> {
    require_admin(&user.0)?;

    let photo = state
        .contests
        .moderate_photo(path.into_inner(), body.into_inner())
        .await?;
    state.cache.invalidate_photos(photo.contest_id).await;

    Ok(HttpResponse::Ok().json(photo))
}

/// PUT /api/admin/users/{id}/membership
pub async fn update_membership(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateMembership>,
) -> Result<HttpResponse, ServiceError> {
    require_admin(&user.0)?;

    let input = body.into_inner();
    if input.max_submissions_per_week.is_some_and(|q| q < 0) {
        return Err(ServiceError::Validation(
            "Weekly quota cannot be negative".into(),
        ));
    }

    let updated = state
        .users
        .update_membership(path.into_inner(), input)
        .await?;

    Ok(HttpResponse::Ok().json(PublicUser::from(updated)))
}
