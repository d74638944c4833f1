use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::repository::StoreError;

/// Every failure a contest operation can surface to a caller.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Contest not found")]
    ContestNotFound,
    #[error("Contest is not open for submissions")]
    ContestNotOpen,
    #[error("Photos cannot be deleted once voting has begun")]
    ContestLocked,
    #[error("Photo not found")]
    PhotoNotFound,
    /// Deliberately the same message for "missing" and "not yours".
    #[error("Photo not found or you are not allowed to modify it")]
    NotFoundOrForbidden,
    #[error("Rating must be a whole number between 1 and 5")]
    InvalidRating,
    #[error("You have already voted on this photo")]
    DuplicateVote,
    #[error("You cannot vote on your own photo")]
    SelfVote,
    #[error("Comment not found")]
    CommentNotFound,
    #[error("You have already flagged this comment")]
    AlreadyFlagged,
    #[error("User not found")]
    UserNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("Weekly submission limit of {limit} reached")]
    QuotaExceeded { limit: u64 },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::ContestNotFound => "CONTEST_NOT_FOUND",
            ServiceError::ContestNotOpen => "CONTEST_NOT_OPEN",
            ServiceError::ContestLocked => "CONTEST_LOCKED",
            ServiceError::PhotoNotFound => "PHOTO_NOT_FOUND",
            ServiceError::NotFoundOrForbidden => "NOT_FOUND_OR_FORBIDDEN",
            ServiceError::InvalidRating => "INVALID_RATING",
            ServiceError::DuplicateVote => "DUPLICATE_VOTE",
            ServiceError::SelfVote => "SELF_VOTE",
            ServiceError::CommentNotFound => "COMMENT_NOT_FOUND",
            ServiceError::AlreadyFlagged => "ALREADY_FLAGGED",
            ServiceError::UserNotFound => "USER_NOT_FOUND",
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::Storage(StoreError::Conflict(_)) => "CONFLICT",
            ServiceError::Storage(StoreError::Missing(_)) => "NOT_FOUND",
            ServiceError::Storage(StoreError::ContestClosed) => "CONTEST_CLOSED",
            ServiceError::Storage(StoreError::Db(_)) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) | ServiceError::InvalidRating => StatusCode::BAD_REQUEST,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) | ServiceError::SelfVote => StatusCode::FORBIDDEN,
            ServiceError::ContestNotFound
            | ServiceError::PhotoNotFound
            | ServiceError::NotFoundOrForbidden
            | ServiceError::CommentNotFound
            | ServiceError::UserNotFound
            | ServiceError::Storage(StoreError::Missing(_)) => StatusCode::NOT_FOUND,
            ServiceError::ContestNotOpen
            | ServiceError::ContestLocked
            | ServiceError::DuplicateVote
            | ServiceError::AlreadyFlagged
            | ServiceError::Storage(StoreError::Conflict(_))
            | ServiceError::Storage(StoreError::ContestClosed) => StatusCode::CONFLICT,
            ServiceError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Storage(StoreError::Db(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ServiceError::Storage(StoreError::Db(e)) => {
                tracing::error!(error = %e, "Database error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": message,
            "code": self.code(),
        }))
    }
}
