use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ServiceError;
use crate::models::photos::SubmitPhoto;
use crate::models::votes::{CastVote, UserVoteResponse};
use crate::service::NewSubmission;
use crate::state::AppState;
use crate::validation::PhotoUpload;

#[derive(Debug, Deserialize)]
pub struct ValidatePhotoQuery {
    pub filename: Option<String>,
}

/// GET /api/contests/{id}/photos — approved photos, best rated first.
pub async fn get_contest_photos(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let contest_id = path.into_inner();

    if let Some(cached) = state.cache.photos(contest_id).await {
        return Ok(HttpResponse::Ok().json(cached.as_ref()));
    }

    let generation = state.cache.photos_generation();
    let photos = Arc::new(state.contests.list_photos(contest_id).await?);
    state
        .cache
        .put_photos(contest_id, photos.clone(), generation)
        .await;

    Ok(HttpResponse::Ok().json(photos.as_ref()))
}

/// POST /api/contests/{id}/photos — submit, or replace the caller's existing
/// submission. Only new submissions count against the weekly quota.
pub async fn submit_photo(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SubmitPhoto>,
) -> Result<HttpResponse, ServiceError> {
    let contest_id = path.into_inner();
    let user = user.0;
    let body = body.into_inner();

    // A closed contest answers 409 even for a caller whose quota is spent.
    state.contests.require_open(contest_id).await?;

    if !user.is_premium && !state.contests.has_submitted(user.id, contest_id).await? {
        let used = state
            .contests
            .weekly_submission_count(user.id, Utc::now())
            .await?;
        let limit = user.max_submissions_per_week.max(0) as u64;
        if used >= limit {
            debug!(user_id = %user.id, used, limit, "Submission rejected: weekly quota reached");
            return Err(ServiceError::QuotaExceeded { limit });
        }
    }

    let submission = state
        .contests
        .submit_photo(NewSubmission {
            contest_id,
            user_id: user.id,
            username: user.public_name(),
            image_url: body.image_url,
            caption: body.caption,
        })
        .await?;

    state.cache.invalidate_photos(contest_id).await;

    let status = if submission.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok(HttpResponse::build(status).json(serde_json::json!({
        "photo": submission.photo,
        "created": submission.created,
    })))
}

/// GET /api/contests/{id}/my-submission
pub async fn my_submission(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let photo = state
        .contests
        .user_submission(user.0.id, path.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "has_submitted": photo.is_some(),
        "photo": photo,
    })))
}

/// POST /api/contests/{id}/validate-photo — raw image bytes in the body.
pub async fn validate_photo(
    _user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ValidatePhotoQuery>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ServiceError> {
    let contest = state
        .contests
        .get_contest(path.into_inner())
        .await?
        .ok_or(ServiceError::ContestNotFound)?;

    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let result = state.validator.validate(
        PhotoUpload {
            content_type,
            filename: query.filename.as_deref(),
            bytes: &body,
        },
        contest.start_date,
        contest.end_date,
    );

    Ok(HttpResponse::Ok().json(result))
}

/// DELETE /api/photos/{id}
pub async fn delete_photo(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let photo = state
        .contests
        .delete_photo(path.into_inner(), user.0.id)
        .await?;

    state.cache.invalidate_photos(photo.contest_id).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Photo deleted",
        "photo_id": photo.id,
    })))
}

/// POST /api/photos/{id}/votes — body: `{"rating": 1..=5}`
pub async fn cast_vote(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CastVote>,
) -> Result<HttpResponse, ServiceError> {
    let photo = state
        .contests
        .vote(path.into_inner(), user.0.id, body.rating)
        .await?;

    state.cache.invalidate_photos(photo.contest_id).await;

    Ok(HttpResponse::Created().json(photo))
}

/// GET /api/photos/{id}/votes/me
pub async fn my_vote(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let photo_id = path.into_inner();
    let rating = state.contests.user_vote(photo_id, user.0.id).await?;

    Ok(HttpResponse::Ok().json(UserVoteResponse { photo_id, rating }))
}
