use std::sync::Arc;

use crate::cache::ListingCache;
use crate::config::AppConfig;
use crate::moderation::comments::CommentService;
use crate::moderation::{AutoApprove, ModerationService, ProfanityFilter};
use crate::repository::{Repositories, UserRepository};
use crate::service::ContestService;
use crate::validation::{ExifCaptureTime, PhotoValidator};

/// Everything a request handler needs, shared through `web::Data`.
pub struct AppState {
    pub contests: ContestService,
    pub comments: CommentService,
    pub users: Arc<dyn UserRepository>,
    pub validator: PhotoValidator,
    pub cache: ListingCache,
    pub jwt_secret: String,
    pub default_weekly_quota: i32,
}

impl AppState {
    /// Build the state with the default moderation policy (auto-approve).
    pub fn new(repos: Repositories, config: &AppConfig) -> Self {
        Self::with_moderation(repos, config, Arc::new(AutoApprove))
    }

    pub fn with_moderation(
        repos: Repositories,
        config: &AppConfig,
        moderation: Arc<dyn ModerationService>,
    ) -> Self {
        Self {
            contests: ContestService::new(&repos, moderation, config.voting_period),
            comments: CommentService::new(&repos, Arc::new(ProfanityFilter::default())),
            users: repos.users.clone(),
            validator: PhotoValidator::new(config.max_upload_bytes, Arc::new(ExifCaptureTime)),
            cache: ListingCache::new(&config.cache),
            jwt_secret: config.jwt_secret.clone(),
            default_weekly_quota: config.default_weekly_quota,
        }
    }
}
