use moka::future::Cache;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::models::contests::{ContestPhase, ContestResponse};
use crate::models::photos;

/// In-process cache for the two hot read paths: contest listings per phase
/// and the approved-photo ranking of a contest.
///
/// Entries are dropped on every write that could change them and expire on
/// their own after the configured TTL.
///
/// Each kind carries a generation counter bumped by every invalidation. A
/// reader takes the generation before loading from the store and hands it to
/// `put_*`; a list loaded before an invalidation is then never served after it.
#[derive(Clone)]
pub struct ListingCache {
    contests: Cache<ContestPhase, Arc<Vec<ContestResponse>>>,
    photos: Cache<Uuid, Arc<Vec<photos::Model>>>,
    contests_generation: Arc<AtomicU64>,
    photos_generation: Arc<AtomicU64>,
}

impl ListingCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            contests: Cache::builder()
                .time_to_live(config.contest_list_ttl)
                .max_capacity(16)
                .build(),
            photos: Cache::builder()
                .time_to_live(config.photo_list_ttl)
                .max_capacity(1_000)
                .build(),
            contests_generation: Arc::new(AtomicU64::new(0)),
            photos_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub async fn contests(&self, phase: ContestPhase) -> Option<Arc<Vec<ContestResponse>>> {
        self.contests.get(&phase).await
    }

    pub fn contests_generation(&self) -> u64 {
        self.contests_generation.load(Ordering::Acquire)
    }

    /// Store a listing loaded under `generation`. Dropped again at once if an
    /// invalidation ran since.
    pub async fn put_contests(
        &self,
        phase: ContestPhase,
        list: Arc<Vec<ContestResponse>>,
        generation: u64,
    ) {
        self.contests.insert(phase, list).await;
        if self.contests_generation() != generation {
            self.contests.invalidate(&phase).await;
        }
    }

    /// Any contest write can move a contest between phases, so every phase goes.
    pub fn invalidate_contests(&self) {
        self.contests_generation.fetch_add(1, Ordering::AcqRel);
        self.contests.invalidate_all();
    }

    pub async fn photos(&self, contest_id: Uuid) -> Option<Arc<Vec<photos::Model>>> {
        self.photos.get(&contest_id).await
    }

    pub fn photos_generation(&self) -> u64 {
        self.photos_generation.load(Ordering::Acquire)
    }

    /// Store a ranking loaded under `generation`. Dropped again at once if an
    /// invalidation ran since.
    pub async fn put_photos(
        &self,
        contest_id: Uuid,
        list: Arc<Vec<photos::Model>>,
        generation: u64,
    ) {
        self.photos.insert(contest_id, list).await;
        if self.photos_generation() != generation {
            self.photos.invalidate(&contest_id).await;
        }
    }

    pub async fn invalidate_photos(&self, contest_id: Uuid) {
        self.photos_generation.fetch_add(1, Ordering::AcqRel);
        self.photos.invalidate(&contest_id).await;
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub contest_list_ttl: Duration,
    pub photo_list_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            contest_list_ttl: Duration::from_secs(60),
            photo_list_ttl: Duration::from_secs(30),
        }
    }
}
