use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::comment_flags;
use crate::models::comments::{self, CommentStatus};
use crate::models::contests::{self, ContestStatus};
use crate::models::photos::{self, ModerationStatus};
use crate::models::users::{self, CompleteProfile, CreateUserFromAuth, UpdateMembership};
use crate::models::votes;
use crate::repository::{
    CommentRepository, ContestRepository, PhotoRepository, StoreError, UserRepository,
    VoteRepository,
};
use crate::service::rating::rounded_average;

#[derive(Default)]
struct Tables {
    contests: Vec<contests::Model>,
    photos: Vec<photos::Model>,
    votes: Vec<votes::Model>,
    comments: Vec<comments::Model>,
    comment_flags: Vec<comment_flags::Model>,
    users: Vec<users::Model>,
}

impl Tables {
    /// Whether the contest owning a photo still accepts submission changes.
    fn contest_is_active(&self, contest_id: Uuid) -> bool {
        self.contests
            .iter()
            .any(|c| c.id == contest_id && c.status == ContestStatus::Active)
    }
}

/// Process-local store. All tables sit behind one lock, so every compound
/// operation is atomic with respect to every other.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContestRepository for MemoryStore {
    async fn contests_with_status(
        &self,
        statuses: &[ContestStatus],
    ) -> Result<Vec<contests::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .contests
            .iter()
            .filter(|c| statuses.contains(&c.status))
            .cloned()
            .collect())
    }

    async fn find_contest(&self, id: Uuid) -> Result<Option<contests::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.contests.iter().find(|c| c.id == id).cloned())
    }

    async fn insert_contest(
        &self,
        contest: contests::Model,
    ) -> Result<contests::Model, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.contests.iter().any(|c| c.id == contest.id) {
            return Err(StoreError::Conflict(format!("contest {} exists", contest.id)));
        }
        tables.contests.push(contest.clone());
        Ok(contest)
    }

    async fn update_contest_status(
        &self,
        id: Uuid,
        status: ContestStatus,
    ) -> Result<Option<contests::Model>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.contests.iter_mut().find(|c| c.id == id).map(|c| {
            c.status = status;
            c.clone()
        }))
    }
}

#[async_trait]
impl PhotoRepository for MemoryStore {
    async fn find_photo(&self, id: Uuid) -> Result<Option<photos::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.photos.iter().find(|p| p.id == id).cloned())
    }

    async fn find_submission(
        &self,
        user_id: Uuid,
        contest_id: Uuid,
    ) -> Result<Option<photos::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .photos
            .iter()
            .find(|p| p.user_id == user_id && p.contest_id == contest_id)
            .cloned())
    }

    async fn photos_in_contest(
        &self,
        contest_id: Uuid,
        status: ModerationStatus,
    ) -> Result<Vec<photos::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .photos
            .iter()
            .filter(|p| p.contest_id == contest_id && p.moderation_status == status)
            .cloned()
            .collect())
    }

    async fn insert_photo(&self, photo: photos::Model) -> Result<photos::Model, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.contest_is_active(photo.contest_id) {
            return Err(StoreError::ContestClosed);
        }
        if tables
            .photos
            .iter()
            .any(|p| p.user_id == photo.user_id && p.contest_id == photo.contest_id)
        {
            return Err(StoreError::Conflict(
                "user already has a photo in this contest".into(),
            ));
        }
        tables.photos.push(photo.clone());
        Ok(photo)
    }

    async fn update_photo_content(
        &self,
        id: Uuid,
        image_url: String,
        caption: Option<String>,
    ) -> Result<photos::Model, StoreError> {
        let mut tables = self.tables.write().await;
        let contest_id = tables
            .photos
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.contest_id)
            .ok_or(StoreError::Missing("photo"))?;
        if !tables.contest_is_active(contest_id) {
            return Err(StoreError::ContestClosed);
        }

        let photo = tables
            .photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::Missing("photo"))?;
        photo.image_url = image_url;
        if let Some(caption) = caption {
            photo.caption = Some(caption);
        }
        photo.updated_at = Some(Utc::now());
        Ok(photo.clone())
    }

    async fn delete_photo_cascade(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(contest_id) = tables.photos.iter().find(|p| p.id == id).map(|p| p.contest_id)
        else {
            return Ok(false);
        };
        if !tables.contest_is_active(contest_id) {
            return Err(StoreError::ContestClosed);
        }

        tables.photos.retain(|p| p.id != id);
        tables.votes.retain(|v| v.photo_id != id);
        let removed: Vec<Uuid> = tables
            .comments
            .iter()
            .filter(|c| c.photo_id == id)
            .map(|c| c.id)
            .collect();
        tables.comments.retain(|c| c.photo_id != id);
        tables
            .comment_flags
            .retain(|f| !removed.contains(&f.comment_id));
        Ok(true)
    }

    async fn update_moderation(
        &self,
        id: Uuid,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<photos::Model, StoreError> {
        let mut tables = self.tables.write().await;
        let photo = tables
            .photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::Missing("photo"))?;

        photo.moderation_status = status;
        photo.moderation_notes = notes;
        photo.updated_at = Some(Utc::now());
        Ok(photo.clone())
    }

    async fn count_photos_between(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .photos
            .iter()
            .filter(|p| p.user_id == user_id && p.created_at >= since && p.created_at <= until)
            .count() as u64)
    }
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn find_vote(
        &self,
        user_id: Uuid,
        photo_id: Uuid,
    ) -> Result<Option<votes::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .find(|v| v.user_id == user_id && v.photo_id == photo_id)
            .cloned())
    }

    async fn record_vote(&self, vote: votes::Model) -> Result<photos::Model, StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.photos.iter().any(|p| p.id == vote.photo_id) {
            return Err(StoreError::Missing("photo"));
        }
        if tables
            .votes
            .iter()
            .any(|v| v.user_id == vote.user_id && v.photo_id == vote.photo_id)
        {
            return Err(StoreError::Conflict("vote already recorded".into()));
        }

        let photo_id = vote.photo_id;
        tables.votes.push(vote);

        let ratings: Vec<i32> = tables
            .votes
            .iter()
            .filter(|v| v.photo_id == photo_id)
            .map(|v| v.rating)
            .collect();

        let photo = tables
            .photos
            .iter_mut()
            .find(|p| p.id == photo_id)
            .ok_or(StoreError::Missing("photo"))?;
        photo.average_rating = rounded_average(&ratings);
        photo.vote_count = ratings.len() as i32;
        Ok(photo.clone())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert_comment(
        &self,
        comment: comments::Model,
    ) -> Result<comments::Model, StoreError> {
        let mut tables = self.tables.write().await;
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<comments::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn visible_comments(
        &self,
        photo_id: Uuid,
    ) -> Result<Vec<comments::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .iter()
            .filter(|c| c.photo_id == photo_id && c.status == CommentStatus::Visible)
            .cloned()
            .collect())
    }

    async fn record_flag(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<comments::Model, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.comments.iter().any(|c| c.id == comment_id) {
            return Err(StoreError::Missing("comment"));
        }
        if tables
            .comment_flags
            .iter()
            .any(|f| f.comment_id == comment_id && f.user_id == user_id)
        {
            return Err(StoreError::Conflict("comment already flagged by this user".into()));
        }

        tables.comment_flags.push(comment_flags::Model {
            id: Uuid::new_v4(),
            comment_id,
            user_id,
            created_at: Utc::now(),
        });
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or(StoreError::Missing("comment"))?;
        comment.flag_count += 1;
        Ok(comment.clone())
    }

    async fn set_comment_status(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<comments::Model, StoreError> {
        let mut tables = self.tables.write().await;
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StoreError::Missing("comment"))?;
        comment.status = status;
        Ok(comment.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_or_create_user(
        &self,
        input: CreateUserFromAuth,
    ) -> Result<users::Model, StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.iter().find(|u| u.id == input.id) {
            return Ok(existing.clone());
        }

        let username = input.username.filter(|name| {
            !tables
                .users
                .iter()
                .any(|u| u.username.as_deref() == Some(name.as_str()))
        });
        let user = users::Model {
            id: input.id,
            email: input.email,
            username,
            display_name: input.display_name,
            avatar_url: input.avatar_url,
            role: input.role,
            is_premium: false,
            max_submissions_per_week: input.max_submissions_per_week,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<users::Model>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn complete_profile(
        &self,
        id: Uuid,
        input: CompleteProfile,
    ) -> Result<users::Model, StoreError> {
        let mut tables = self.tables.write().await;

        if let Some(username) = &input.username {
            if tables
                .users
                .iter()
                .any(|u| u.id != id && u.username.as_deref() == Some(username.as_str()))
            {
                return Err(StoreError::Conflict("username already taken".into()));
            }
        }

        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::Missing("user"))?;

        if let Some(username) = input.username {
            user.username = Some(username);
        }
        if let Some(display_name) = input.display_name {
            user.display_name = Some(display_name);
        }
        if let Some(avatar_url) = input.avatar_url {
            user.avatar_url = Some(avatar_url);
        }
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }

    async fn update_membership(
        &self,
        id: Uuid,
        input: UpdateMembership,
    ) -> Result<users::Model, StoreError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::Missing("user"))?;

        if let Some(is_premium) = input.is_premium {
            user.is_premium = is_premium;
        }
        if let Some(quota) = input.max_submissions_per_week {
            user.max_submissions_per_week = quota;
        }
        user.updated_at = Some(Utc::now());
        Ok(user.clone())
    }
}
