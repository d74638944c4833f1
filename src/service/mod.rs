//! Contest participation rules: submission eligibility, one vote per user,
//! rating aggregation and weekly quota counting.

pub mod phase;
pub mod rating;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::contests::{self, ContestPhase, ContestStatus, CreateContest};
use crate::models::photos::{self, ModeratePhoto, ModerationStatus};
use crate::models::votes;
use crate::moderation::ModerationService;
use crate::repository::{
    ContestRepository, PhotoRepository, Repositories, StoreError, VoteRepository,
};

pub use phase::PhaseTransition;
pub use rating::Rating;

/// Longest caption accepted on a submission, in characters.
pub const MAX_CAPTION_CHARS: usize = 200;

/// Rolling window used for the weekly submission quota.
pub const QUOTA_WINDOW_DAYS: i64 = 7;

/// Input for [`ContestService::submit_photo`].
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub contest_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub image_url: String,
    pub caption: Option<String>,
}

/// Result of a submit-or-update call.
#[derive(Debug, Clone)]
pub struct Submission {
    pub photo: photos::Model,
    /// `false` when an existing submission was overwritten.
    pub created: bool,
}

pub struct ContestService {
    contests: Arc<dyn ContestRepository>,
    photos: Arc<dyn PhotoRepository>,
    votes: Arc<dyn VoteRepository>,
    moderation: Arc<dyn ModerationService>,
    voting_period: Duration,
}

impl ContestService {
    pub fn new(
        repos: &Repositories,
        moderation: Arc<dyn ModerationService>,
        voting_period: Duration,
    ) -> Self {
        Self {
            contests: repos.contests.clone(),
            photos: repos.photos.clone(),
            votes: repos.votes.clone(),
            moderation,
            voting_period,
        }
    }

    // ── Contests ──

    /// Contests in `phase`, ordered for display: active/voting by soonest end,
    /// upcoming by soonest start, completed by most recent end.
    pub async fn list_contests(
        &self,
        phase: ContestPhase,
    ) -> Result<Vec<contests::Model>, ServiceError> {
        let mut contests = self.contests.contests_with_status(phase.statuses()).await?;
        phase::sort_for_phase(phase, &mut contests);
        Ok(contests)
    }

    pub async fn get_contest(&self, id: Uuid) -> Result<Option<contests::Model>, ServiceError> {
        Ok(self.contests.find_contest(id).await?)
    }

    pub async fn create_contest(
        &self,
        created_by: Uuid,
        input: CreateContest,
    ) -> Result<contests::Model, ServiceError> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ServiceError::Validation("Title is required".into()));
        }
        if input.start_date >= input.end_date {
            return Err(ServiceError::Validation(
                "Start date must be before end date".into(),
            ));
        }

        let status = input.status.unwrap_or(ContestStatus::Upcoming);
        if !matches!(status, ContestStatus::Draft | ContestStatus::Upcoming) {
            return Err(ServiceError::Validation(
                "New contests start as draft or upcoming".into(),
            ));
        }

        let contest = contests::Model {
            id: Uuid::new_v4(),
            title,
            description: input.description,
            category: input.category.unwrap_or(contests::Category::Other),
            cover_image_url: input.cover_image_url,
            status,
            start_date: input.start_date,
            end_date: input.end_date,
            created_by,
            created_at: Utc::now(),
        };

        let contest = self.contests.insert_contest(contest).await?;
        info!(contest_id = %contest.id, status = ?contest.status, "Contest created");
        Ok(contest)
    }

    /// Externally driven status change (admin or scheduler).
    pub async fn set_contest_status(
        &self,
        id: Uuid,
        status: ContestStatus,
    ) -> Result<contests::Model, ServiceError> {
        let contest = self
            .contests
            .update_contest_status(id, status)
            .await?
            .ok_or(ServiceError::ContestNotFound)?;
        info!(contest_id = %id, status = ?status, "Contest status set");
        Ok(contest)
    }

    /// Move every contest whose dates have passed into its next phase.
    /// Calling this repeatedly with the same `now` changes nothing further.
    pub async fn advance_phases(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<PhaseTransition>, ServiceError> {
        let candidates = self
            .contests
            .contests_with_status(&[
                ContestStatus::Upcoming,
                ContestStatus::Active,
                ContestStatus::Voting,
            ])
            .await?;

        let mut transitions = Vec::new();
        for contest in candidates {
            let Some(to) = phase::target_status(&contest, now, self.voting_period) else {
                continue;
            };
            if self.contests.update_contest_status(contest.id, to).await?.is_some() {
                info!(contest_id = %contest.id, from = ?contest.status, to = ?to, "Contest phase advanced");
                transitions.push(PhaseTransition {
                    contest_id: contest.id,
                    from: contest.status,
                    to,
                });
            }
        }

        Ok(transitions)
    }

    // ── Photos ──

    /// Approved photos of a contest, best rated first.
    pub async fn list_photos(&self, contest_id: Uuid) -> Result<Vec<photos::Model>, ServiceError> {
        let mut photos = self
            .photos
            .photos_in_contest(contest_id, ModerationStatus::Approved)
            .await?;
        // Stable sort keeps insertion order among equal ratings.
        photos.sort_by(|a, b| b.average_rating.total_cmp(&a.average_rating));
        Ok(photos)
    }

    pub async fn find_photo(&self, id: Uuid) -> Result<Option<photos::Model>, ServiceError> {
        Ok(self.photos.find_photo(id).await?)
    }

    pub async fn user_submission(
        &self,
        user_id: Uuid,
        contest_id: Uuid,
    ) -> Result<Option<photos::Model>, ServiceError> {
        Ok(self.photos.find_submission(user_id, contest_id).await?)
    }

    pub async fn has_submitted(&self, user_id: Uuid, contest_id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.user_submission(user_id, contest_id).await?.is_some())
    }

    /// Submit a photo to an active contest. A second submission by the same
    /// user replaces the image (and caption, if given) of the first one.
    pub async fn submit_photo(&self, input: NewSubmission) -> Result<Submission, ServiceError> {
        let image_url = input.image_url.trim().to_string();
        if image_url.is_empty() {
            return Err(ServiceError::Validation("Image is required".into()));
        }
        if let Some(caption) = &input.caption {
            if caption.chars().count() > MAX_CAPTION_CHARS {
                return Err(ServiceError::Validation(format!(
                    "Caption must be at most {MAX_CAPTION_CHARS} characters"
                )));
            }
        }

        self.require_open(input.contest_id).await?;

        if let Some(existing) = self
            .photos
            .find_submission(input.user_id, input.contest_id)
            .await?
        {
            return self.overwrite(existing.id, image_url, input.caption).await;
        }

        let now = Utc::now();
        let mut photo = photos::Model {
            id: Uuid::new_v4(),
            contest_id: input.contest_id,
            user_id: input.user_id,
            username: input.username,
            image_url: image_url.clone(),
            caption: input.caption.clone(),
            average_rating: 0.0,
            vote_count: 0,
            moderation_status: ModerationStatus::Pending,
            moderation_notes: None,
            created_at: now,
            updated_at: None,
        };
        photo.moderation_status = self.moderation.initial_status(&photo);

        match self.photos.insert_photo(photo).await {
            Err(StoreError::ContestClosed) => Err(ServiceError::ContestNotOpen),
            Ok(photo) => {
                info!(photo_id = %photo.id, contest_id = %photo.contest_id, user_id = %photo.user_id, "Photo submitted");
                Ok(Submission {
                    photo,
                    created: true,
                })
            }
            // Lost a race with a concurrent first submission: fold into it.
            Err(StoreError::Conflict(_)) => {
                let existing = self
                    .photos
                    .find_submission(input.user_id, input.contest_id)
                    .await?
                    .ok_or(StoreError::Missing("photo"))?;
                self.overwrite(existing.id, image_url, input.caption).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn overwrite(
        &self,
        photo_id: Uuid,
        image_url: String,
        caption: Option<String>,
    ) -> Result<Submission, ServiceError> {
        let photo = self
            .photos
            .update_photo_content(photo_id, image_url, caption)
            .await
            .map_err(|e| match e {
                StoreError::ContestClosed => ServiceError::ContestNotOpen,
                other => other.into(),
            })?;
        info!(photo_id = %photo.id, contest_id = %photo.contest_id, "Submission updated");
        Ok(Submission {
            photo,
            created: false,
        })
    }

    /// Fails with `ContestNotOpen` unless the contest exists and is `Active`.
    pub async fn require_open(&self, contest_id: Uuid) -> Result<contests::Model, ServiceError> {
        match self.contests.find_contest(contest_id).await? {
            Some(contest) if contest.status == ContestStatus::Active => Ok(contest),
            other => {
                debug!(contest_id = %contest_id, status = ?other.map(|c| c.status), "Submission rejected: contest not open");
                Err(ServiceError::ContestNotOpen)
            }
        }
    }

    /// Delete the requester's own photo while its contest is still active.
    /// Votes and comments on the photo go with it.
    pub async fn delete_photo(
        &self,
        photo_id: Uuid,
        requester_id: Uuid,
    ) -> Result<photos::Model, ServiceError> {
        let photo = match self.photos.find_photo(photo_id).await? {
            Some(photo) if photo.user_id == requester_id => photo,
            _ => return Err(ServiceError::NotFoundOrForbidden),
        };

        let contest = self.contests.find_contest(photo.contest_id).await?;
        if contest.map(|c| c.status) != Some(ContestStatus::Active) {
            debug!(photo_id = %photo_id, "Delete rejected: contest locked");
            return Err(ServiceError::ContestLocked);
        }

        // The store re-checks the status under its own lock; the check above
        // only gives an early answer.
        match self.photos.delete_photo_cascade(photo_id).await {
            Ok(true) => {}
            Ok(false) => return Err(ServiceError::NotFoundOrForbidden),
            Err(StoreError::ContestClosed) => {
                debug!(photo_id = %photo_id, "Delete rejected: contest closed concurrently");
                return Err(ServiceError::ContestLocked);
            }
            Err(e) => return Err(e.into()),
        }

        info!(photo_id = %photo_id, contest_id = %photo.contest_id, user_id = %requester_id, "Photo deleted");
        Ok(photo)
    }

    pub async fn moderate_photo(
        &self,
        photo_id: Uuid,
        input: ModeratePhoto,
    ) -> Result<photos::Model, ServiceError> {
        if self.photos.find_photo(photo_id).await?.is_none() {
            return Err(ServiceError::PhotoNotFound);
        }
        let photo = self
            .photos
            .update_moderation(photo_id, input.status, input.notes)
            .await?;
        info!(photo_id = %photo_id, status = ?photo.moderation_status, "Photo moderated");
        Ok(photo)
    }

    // ── Votes ──

    /// Cast a single, final rating on someone else's photo. Returns the photo
    /// with its recomputed average and vote count.
    pub async fn vote(
        &self,
        photo_id: Uuid,
        user_id: Uuid,
        rating: f64,
    ) -> Result<photos::Model, ServiceError> {
        let photo = self
            .photos
            .find_photo(photo_id)
            .await?
            .ok_or(ServiceError::PhotoNotFound)?;

        if photo.user_id == user_id {
            return Err(ServiceError::SelfVote);
        }

        let rating = Rating::new(rating)?;

        if self.votes.find_vote(user_id, photo_id).await?.is_some() {
            debug!(photo_id = %photo_id, user_id = %user_id, "Vote rejected: already voted");
            return Err(ServiceError::DuplicateVote);
        }

        let vote = votes::Model {
            id: Uuid::new_v4(),
            photo_id,
            user_id,
            rating: i32::from(rating.value()),
            created_at: Utc::now(),
        };

        let photo = self.votes.record_vote(vote).await.map_err(|e| match e {
            StoreError::Conflict(_) => ServiceError::DuplicateVote,
            StoreError::Missing(_) => ServiceError::PhotoNotFound,
            other => other.into(),
        })?;

        info!(
            photo_id = %photo_id,
            user_id = %user_id,
            rating = rating.value(),
            average_rating = photo.average_rating,
            vote_count = photo.vote_count,
            "Vote recorded"
        );
        Ok(photo)
    }

    pub async fn user_vote(&self, photo_id: Uuid, user_id: Uuid) -> Result<Option<u8>, ServiceError> {
        Ok(self
            .votes
            .find_vote(user_id, photo_id)
            .await?
            .map(|v| v.rating as u8))
    }

    // ── Quota ──

    /// Photos the user created in the trailing seven days ending at `now`.
    pub async fn weekly_submission_count(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, ServiceError> {
        let since = now - Duration::days(QUOTA_WINDOW_DAYS);
        Ok(self.photos.count_photos_between(user_id, since, now).await?)
    }
}
