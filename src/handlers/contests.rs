use actix_web::{HttpResponse, web};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::contests::{ContestListQuery, ContestResponse};
use crate::state::AppState;

/// GET /api/contests?phase=active_or_voting|upcoming|completed
pub async fn get_contests(
    state: web::Data<AppState>,
    query: web::Query<ContestListQuery>,
) -> Result<HttpResponse, ServiceError> {
    let phase = query.phase();

    if let Some(cached) = state.cache.contests(phase).await {
        return Ok(HttpResponse::Ok().json(cached.as_ref()));
    }

    let generation = state.cache.contests_generation();
    let contests: Vec<ContestResponse> = state
        .contests
        .list_contests(phase)
        .await?
        .into_iter()
        .map(ContestResponse::from)
        .collect();
    let contests = Arc::new(contests);
    state
        .cache
        .put_contests(phase, contests.clone(), generation)
        .await;

    Ok(HttpResponse::Ok().json(contests.as_ref()))
}

/// GET /api/contests/{id}
pub async fn get_contest(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let contest = state
        .contests
        .get_contest(path.into_inner())
        .await?
        .ok_or(ServiceError::ContestNotFound)?;

    Ok(HttpResponse::Ok().json(ContestResponse::from(contest)))
}
