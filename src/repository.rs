//! Storage contracts the rules engine depends on.
//!
//! Every compound operation (`insert_photo`, `record_vote`,
//! `update_photo_content`, `delete_photo_cascade`, `record_flag`) must be
//! atomic: either all of its writes become visible together or none of them do.
//! Photo writes re-check the owning contest's status inside the same unit of
//! work, so a contest that leaves `Active` concurrently can never gain, lose or
//! change a submission afterwards.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::comments::{self, CommentStatus};
use crate::models::contests::{self, ContestStatus};
use crate::models::photos::{self, ModerationStatus};
use crate::models::users::{self, CompleteProfile, CreateUserFromAuth, UpdateMembership};
use crate::models::votes;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness rule was violated, e.g. a second vote for the same pair.
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("{0} not found")]
    Missing(&'static str),
    /// The photo's contest no longer accepts submission changes.
    #[error("contest is not accepting changes")]
    ContestClosed,
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

#[async_trait]
pub trait ContestRepository: Send + Sync {
    /// Contests whose status is one of `statuses`, in no particular order.
    async fn contests_with_status(
        &self,
        statuses: &[ContestStatus],
    ) -> Result<Vec<contests::Model>, StoreError>;

    async fn find_contest(&self, id: Uuid) -> Result<Option<contests::Model>, StoreError>;

    async fn insert_contest(&self, contest: contests::Model)
    -> Result<contests::Model, StoreError>;

    async fn update_contest_status(
        &self,
        id: Uuid,
        status: ContestStatus,
    ) -> Result<Option<contests::Model>, StoreError>;
}

#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn find_photo(&self, id: Uuid) -> Result<Option<photos::Model>, StoreError>;

    async fn find_submission(
        &self,
        user_id: Uuid,
        contest_id: Uuid,
    ) -> Result<Option<photos::Model>, StoreError>;

    /// Photos of a contest with the given moderation status, oldest first.
    async fn photos_in_contest(
        &self,
        contest_id: Uuid,
        status: ModerationStatus,
    ) -> Result<Vec<photos::Model>, StoreError>;

    /// Fails with `Conflict` when the user already has a photo in the contest
    /// and with `ContestClosed` unless the contest is `Active`.
    async fn insert_photo(&self, photo: photos::Model) -> Result<photos::Model, StoreError>;

    /// Overwrites the image and, when given, the caption. Fails with
    /// `ContestClosed` unless the photo's contest is `Active`.
    async fn update_photo_content(
        &self,
        id: Uuid,
        image_url: String,
        caption: Option<String>,
    ) -> Result<photos::Model, StoreError>;

    /// Removes the photo together with every vote and comment referencing it.
    /// Returns `false` when the photo did not exist and fails with
    /// `ContestClosed` unless the photo's contest is `Active`.
    async fn delete_photo_cascade(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn update_moderation(
        &self,
        id: Uuid,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<photos::Model, StoreError>;

    /// Photos the user created in the closed window `[since, until]`.
    async fn count_photos_between(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find_vote(
        &self,
        user_id: Uuid,
        photo_id: Uuid,
    ) -> Result<Option<votes::Model>, StoreError>;

    /// Inserts the vote and recomputes the photo's `average_rating` and
    /// `vote_count` in the same unit of work, returning the updated photo.
    /// Fails with `Conflict` on a second vote for the same (user, photo) and
    /// with `Missing("photo")` when the photo is gone.
    async fn record_vote(&self, vote: votes::Model) -> Result<photos::Model, StoreError>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert_comment(
        &self,
        comment: comments::Model,
    ) -> Result<comments::Model, StoreError>;

    async fn find_comment(&self, id: Uuid) -> Result<Option<comments::Model>, StoreError>;

    /// Visible comments of a photo, oldest first.
    async fn visible_comments(&self, photo_id: Uuid)
    -> Result<Vec<comments::Model>, StoreError>;

    /// Records one flag from `user_id` and bumps the comment's counter in the
    /// same unit of work, returning the updated comment. Fails with `Conflict`
    /// when that user already flagged the comment.
    async fn record_flag(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<comments::Model, StoreError>;

    async fn set_comment_status(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<comments::Model, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns the user with `input.id`, provisioning it on first sight. A
    /// username already held by someone else is dropped rather than failing.
    async fn find_or_create_user(
        &self,
        input: CreateUserFromAuth,
    ) -> Result<users::Model, StoreError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<users::Model>, StoreError>;

    async fn complete_profile(
        &self,
        id: Uuid,
        input: CompleteProfile,
    ) -> Result<users::Model, StoreError>;

    async fn update_membership(
        &self,
        id: Uuid,
        input: UpdateMembership,
    ) -> Result<users::Model, StoreError>;
}

/// The full set of repositories, each behind its own trait object.
#[derive(Clone)]
pub struct Repositories {
    pub contests: Arc<dyn ContestRepository>,
    pub photos: Arc<dyn PhotoRepository>,
    pub votes: Arc<dyn VoteRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    /// Wire every repository to one backing store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ContestRepository
            + PhotoRepository
            + VoteRepository
            + CommentRepository
            + UserRepository
            + 'static,
    {
        Self {
            contests: store.clone(),
            photos: store.clone(),
            votes: store.clone(),
            comments: store.clone(),
            users: store,
        }
    }
}
