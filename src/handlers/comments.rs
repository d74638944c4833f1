use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ServiceError;
use crate::models::comments::{CreateComment, ProfanityCheck};
use crate::state::AppState;

/// GET /api/photos/{id}/comments
pub async fn get_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let comments = state.comments.list_comments(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/photos/{id}/comments
pub async fn add_comment(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CreateComment>,
) -> Result<HttpResponse, ServiceError> {
    let user = user.0;
    let comment = state
        .comments
        .add_comment(path.into_inner(), user.id, user.public_name(), &body.text)
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// POST /api/comments/{id}/flag
pub async fn flag_comment(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ServiceError> {
    let comment = state
        .comments
        .flag_comment(path.into_inner(), user.0.id)
        .await?;
    Ok(HttpResponse::Ok().json(comment))
}

/// POST /api/moderation/profanity-check — body: `{"text": "...", "strict": false}`
pub async fn profanity_check(
    state: web::Data<AppState>,
    body: web::Json<ProfanityCheck>,
) -> HttpResponse {
    let contains_profanity = state
        .comments
        .filter()
        .contains_profanity(&body.text, body.strict);

    HttpResponse::Ok().json(serde_json::json!({ "contains_profanity": contains_profanity }))
}
