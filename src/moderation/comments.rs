use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::comments::{self, CommentStatus};
use crate::moderation::{ProfanityFilter, escalate};
use crate::repository::{CommentRepository, PhotoRepository, Repositories, StoreError};

pub const MAX_COMMENT_CHARS: usize = 500;

/// Comments on photos, screened by the profanity filter and taken down by
/// escalating community flags.
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    photos: Arc<dyn PhotoRepository>,
    filter: Arc<ProfanityFilter>,
}

impl CommentService {
    pub fn new(repos: &Repositories, filter: Arc<ProfanityFilter>) -> Self {
        Self {
            comments: repos.comments.clone(),
            photos: repos.photos.clone(),
            filter,
        }
    }

    pub fn filter(&self) -> &ProfanityFilter {
        &self.filter
    }

    pub async fn add_comment(
        &self,
        photo_id: Uuid,
        user_id: Uuid,
        username: String,
        text: &str,
    ) -> Result<comments::Model, ServiceError> {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_COMMENT_CHARS {
            return Err(ServiceError::Validation(format!(
                "Comment must be between 1 and {MAX_COMMENT_CHARS} characters"
            )));
        }
        if self.filter.contains_profanity(text, false) {
            return Err(ServiceError::Validation(
                "Comment contains inappropriate language".into(),
            ));
        }
        if self.photos.find_photo(photo_id).await?.is_none() {
            return Err(ServiceError::PhotoNotFound);
        }

        let comment = comments::Model {
            id: Uuid::new_v4(),
            photo_id,
            user_id,
            username,
            text: text.to_string(),
            flag_count: 0,
            status: CommentStatus::Visible,
            created_at: Utc::now(),
        };

        Ok(self.comments.insert_comment(comment).await?)
    }

    pub async fn list_comments(&self, photo_id: Uuid) -> Result<Vec<comments::Model>, ServiceError> {
        Ok(self.comments.visible_comments(photo_id).await?)
    }

    /// Record `user_id`'s flag on a comment and apply the escalation policy.
    /// Each user counts once per comment.
    pub async fn flag_comment(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<comments::Model, ServiceError> {
        match self.comments.find_comment(comment_id).await? {
            Some(c) if c.status == CommentStatus::Visible => {}
            _ => return Err(ServiceError::CommentNotFound),
        }

        let flagged = self
            .comments
            .record_flag(comment_id, user_id)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ServiceError::AlreadyFlagged,
                StoreError::Missing(_) => ServiceError::CommentNotFound,
                other => other.into(),
            })?;
        let status = escalate(flagged.flag_count, &flagged.text, &self.filter);
        if status == flagged.status {
            return Ok(flagged);
        }

        let updated = self.comments.set_comment_status(comment_id, status).await?;
        info!(comment_id = %comment_id, flags = updated.flag_count, "Comment removed after flagging");
        Ok(updated)
    }
}
