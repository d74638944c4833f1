//! Contest participation rules exercised against the in-memory store.
//!
//! Run with: `cargo test --test contest_rules_test`
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use photo_contest_backend::error::ServiceError;
use photo_contest_backend::models::contests::{
    self, Category, ContestPhase, ContestStatus, CreateContest,
};
use photo_contest_backend::models::photos::{self, ModeratePhoto, ModerationStatus};
use photo_contest_backend::moderation::{AutoApprove, ManualReview, ModerationService};
use photo_contest_backend::repository::{
    ContestRepository, PhotoRepository, Repositories, StoreError, VoteRepository,
};
use photo_contest_backend::service::{ContestService, NewSubmission};
use photo_contest_backend::store::MemoryStore;

fn setup_with(moderation: Arc<dyn ModerationService>) -> (Arc<MemoryStore>, ContestService) {
    let store = Arc::new(MemoryStore::new());
    let repos = Repositories::from_store(store.clone());
    let service = ContestService::new(&repos, moderation, Duration::hours(72));
    (store, service)
}

fn setup() -> (Arc<MemoryStore>, ContestService) {
    setup_with(Arc::new(AutoApprove))
}

fn contest_model(
    status: ContestStatus,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> contests::Model {
    contests::Model {
        id: Uuid::new_v4(),
        title: "Golden hour".into(),
        description: "Light at dusk".into(),
        category: Category::Landscape,
        cover_image_url: None,
        status,
        start_date: start,
        end_date: end,
        created_by: Uuid::new_v4(),
        created_at: start,
    }
}

async fn seed_contest(store: &MemoryStore, status: ContestStatus) -> contests::Model {
    let now = Utc::now();
    store
        .insert_contest(contest_model(status, now - Duration::days(1), now + Duration::days(6)))
        .await
        .unwrap()
}

fn submission(contest_id: Uuid, user_id: Uuid, caption: &str) -> NewSubmission {
    NewSubmission {
        contest_id,
        user_id,
        username: "photog".into(),
        image_url: format!("https://cdn.example.com/{user_id}.jpg"),
        caption: Some(caption.into()),
    }
}

fn photo_model(contest_id: Uuid, user_id: Uuid, created_at: DateTime<Utc>) -> photos::Model {
    photos::Model {
        id: Uuid::new_v4(),
        contest_id,
        user_id,
        username: "photog".into(),
        image_url: "https://cdn.example.com/p.jpg".into(),
        caption: None,
        average_rating: 0.0,
        vote_count: 0,
        moderation_status: ModerationStatus::Approved,
        moderation_notes: None,
        created_at,
        updated_at: None,
    }
}

#[tokio::test]
async fn test_submit_vote_and_lock_scenario() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());

    let first = service
        .submit_photo(submission(contest.id, u1, "Sunset"))
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.photo.moderation_status, ModerationStatus::Approved);
    assert_eq!(first.photo.vote_count, 0);

    let second = service
        .submit_photo(submission(contest.id, u1, "Sunset v2"))
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.photo.id, first.photo.id);
    assert_eq!(second.photo.caption.as_deref(), Some("Sunset v2"));

    let listed = service.list_photos(contest.id).await.unwrap();
    assert_eq!(listed.len(), 1);

    let voted = service.vote(first.photo.id, u2, 4.0).await.unwrap();
    assert_eq!(voted.average_rating, 4.0);
    assert_eq!(voted.vote_count, 1);

    let again = service.vote(first.photo.id, u2, 2.0).await;
    assert!(matches!(again, Err(ServiceError::DuplicateVote)));
    let unchanged = service.find_photo(first.photo.id).await.unwrap().unwrap();
    assert_eq!(unchanged.average_rating, 4.0);
    assert_eq!(unchanged.vote_count, 1);

    service
        .set_contest_status(contest.id, ContestStatus::Voting)
        .await
        .unwrap();
    let delete = service.delete_photo(first.photo.id, u1).await;
    assert!(matches!(delete, Err(ServiceError::ContestLocked)));
    assert!(service.find_photo(first.photo.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_submit_requires_active_contest() {
    let (store, service) = setup();

    for status in [
        ContestStatus::Draft,
        ContestStatus::Upcoming,
        ContestStatus::Voting,
        ContestStatus::Completed,
    ] {
        let contest = seed_contest(&store, status).await;
        let result = service
            .submit_photo(submission(contest.id, Uuid::new_v4(), "Late"))
            .await;
        assert!(
            matches!(result, Err(ServiceError::ContestNotOpen)),
            "status {status:?} should reject submissions"
        );
    }

    let missing = service
        .submit_photo(submission(Uuid::new_v4(), Uuid::new_v4(), "Nowhere"))
        .await;
    assert!(matches!(missing, Err(ServiceError::ContestNotOpen)));
}

#[tokio::test]
async fn test_submit_validates_caption_and_image() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;

    let long_caption = "x".repeat(201);
    let result = service
        .submit_photo(submission(contest.id, Uuid::new_v4(), &long_caption))
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));

    let mut blank = submission(contest.id, Uuid::new_v4(), "Blank");
    blank.image_url = "   ".into();
    assert!(matches!(
        service.submit_photo(blank).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn test_resubmit_without_caption_keeps_previous_caption() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let user = Uuid::new_v4();

    service
        .submit_photo(submission(contest.id, user, "Keep me"))
        .await
        .unwrap();

    let mut update = submission(contest.id, user, "");
    update.caption = None;
    update.image_url = "https://cdn.example.com/new.jpg".into();
    let updated = service.submit_photo(update).await.unwrap();

    assert_eq!(updated.photo.image_url, "https://cdn.example.com/new.jpg");
    assert_eq!(updated.photo.caption.as_deref(), Some("Keep me"));
    assert!(service.has_submitted(user, contest.id).await.unwrap());
}

#[tokio::test]
async fn test_invalid_ratings_are_rejected_without_mutation() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let photo = service
        .submit_photo(submission(contest.id, Uuid::new_v4(), "Dunes"))
        .await
        .unwrap()
        .photo;
    let voter = Uuid::new_v4();

    for rating in [0.0, 6.0, 2.5, -1.0, f64::NAN, f64::INFINITY] {
        let result = service.vote(photo.id, voter, rating).await;
        assert!(
            matches!(result, Err(ServiceError::InvalidRating)),
            "rating {rating} should be rejected"
        );
    }

    assert_eq!(store.find_photo(photo.id).await.unwrap().unwrap().vote_count, 0);
    assert_eq!(service.user_vote(photo.id, voter).await.unwrap(), None);

    // The voter can still cast a valid vote afterwards.
    service.vote(photo.id, voter, 5.0).await.unwrap();
    assert_eq!(service.user_vote(photo.id, voter).await.unwrap(), Some(5));
}

#[tokio::test]
async fn test_vote_preconditions_in_order() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let owner = Uuid::new_v4();
    let photo = service
        .submit_photo(submission(contest.id, owner, "Mine"))
        .await
        .unwrap()
        .photo;

    let missing = service.vote(Uuid::new_v4(), owner, 9.0).await;
    assert!(matches!(missing, Err(ServiceError::PhotoNotFound)));

    // Self-vote is checked before the rating itself.
    let own = service.vote(photo.id, owner, 9.0).await;
    assert!(matches!(own, Err(ServiceError::SelfVote)));
    assert_eq!(
        service.find_photo(photo.id).await.unwrap().unwrap().vote_count,
        0
    );
}

#[tokio::test]
async fn test_average_is_rounded_to_one_decimal() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let photo = service
        .submit_photo(submission(contest.id, Uuid::new_v4(), "Fog"))
        .await
        .unwrap()
        .photo;

    let mut last = None;
    for rating in [4.0, 5.0, 5.0] {
        last = Some(service.vote(photo.id, Uuid::new_v4(), rating).await.unwrap());
    }

    let photo = last.unwrap();
    assert_eq!(photo.vote_count, 3);
    assert_eq!(photo.average_rating, 4.7);
    assert_eq!(store.find_photo(photo.id).await.unwrap().unwrap().vote_count, 3);
}

#[tokio::test]
async fn test_concurrent_votes_keep_aggregate_consistent() {
    let (store, service) = setup();
    let service = Arc::new(service);
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let photo = service
        .submit_photo(submission(contest.id, Uuid::new_v4(), "Crowd"))
        .await
        .unwrap()
        .photo;

    let mut handles = Vec::new();
    for i in 0..20i32 {
        let service = service.clone();
        let rating = f64::from(i % 5 + 1);
        handles.push(tokio::spawn(async move {
            service.vote(photo.id, Uuid::new_v4(), rating).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let photo = service.find_photo(photo.id).await.unwrap().unwrap();
    assert_eq!(photo.vote_count, 20);
    assert_eq!(photo.average_rating, 3.0);
}

#[tokio::test]
async fn test_concurrent_duplicate_votes_record_once() {
    let (store, service) = setup();
    let service = Arc::new(service);
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let photo = service
        .submit_photo(submission(contest.id, Uuid::new_v4(), "Race"))
        .await
        .unwrap()
        .photo;
    let voter = Uuid::new_v4();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.vote(photo.id, voter, 3.0).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(ServiceError::DuplicateVote) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(store.find_vote(voter, photo.id).await.unwrap().unwrap().rating, 3);
    assert_eq!(store.find_photo(photo.id).await.unwrap().unwrap().vote_count, 1);
}

#[tokio::test]
async fn test_concurrent_first_submissions_create_one_photo() {
    let (store, service) = setup();
    let service = Arc::new(service);
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let user = Uuid::new_v4();

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = service.clone();
        let contest_id = contest.id;
        handles.push(tokio::spawn(async move {
            service
                .submit_photo(submission(contest_id, user, &format!("take {i}")))
                .await
        }));
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().created {
            created += 1;
        }
    }

    assert_eq!(created, 1);
    let photos = store
        .photos_in_contest(contest.id, ModerationStatus::Approved)
        .await
        .unwrap();
    assert_eq!(photos.len(), 1);
}

#[tokio::test]
async fn test_delete_requires_owner_and_cascades_votes() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let owner = Uuid::new_v4();
    let photo = service
        .submit_photo(submission(contest.id, owner, "Pier"))
        .await
        .unwrap()
        .photo;
    let voters = [Uuid::new_v4(), Uuid::new_v4()];
    service.vote(photo.id, voters[0], 3.0).await.unwrap();
    service.vote(photo.id, voters[1], 5.0).await.unwrap();

    let stranger = service.delete_photo(photo.id, Uuid::new_v4()).await;
    assert!(matches!(stranger, Err(ServiceError::NotFoundOrForbidden)));

    let missing = service.delete_photo(Uuid::new_v4(), owner).await;
    assert!(matches!(missing, Err(ServiceError::NotFoundOrForbidden)));

    let deleted = service.delete_photo(photo.id, owner).await.unwrap();
    assert_eq!(deleted.id, photo.id);
    assert!(service.find_photo(photo.id).await.unwrap().is_none());
    for voter in voters {
        assert!(store.find_vote(voter, photo.id).await.unwrap().is_none());
    }
    assert!(!service.has_submitted(owner, contest.id).await.unwrap());
}

#[tokio::test]
async fn test_list_photos_only_approved_best_first() {
    let (store, service) = setup_with(Arc::new(ManualReview));
    let contest = seed_contest(&store, ContestStatus::Active).await;

    let mut ids = Vec::new();
    for caption in ["a", "b", "c"] {
        let photo = service
            .submit_photo(submission(contest.id, Uuid::new_v4(), caption))
            .await
            .unwrap()
            .photo;
        assert_eq!(photo.moderation_status, ModerationStatus::Pending);
        ids.push(photo.id);
    }
    assert!(service.list_photos(contest.id).await.unwrap().is_empty());

    for id in &ids[..2] {
        service
            .moderate_photo(
                *id,
                ModeratePhoto {
                    status: ModerationStatus::Approved,
                    notes: None,
                },
            )
            .await
            .unwrap();
    }
    service.vote(ids[1], Uuid::new_v4(), 5.0).await.unwrap();

    let listed: Vec<Uuid> = service
        .list_photos(contest.id)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(listed, vec![ids[1], ids[0]]);

    let missing = service
        .moderate_photo(
            Uuid::new_v4(),
            ModeratePhoto {
                status: ModerationStatus::Rejected,
                notes: Some("blurry".into()),
            },
        )
        .await;
    assert!(matches!(missing, Err(ServiceError::PhotoNotFound)));
}

#[tokio::test]
async fn test_list_contests_orders_each_phase() {
    let (store, service) = setup();
    let now = Utc::now();
    let day = Duration::days(1);

    let ends_late = store
        .insert_contest(contest_model(ContestStatus::Active, now - day, now + day * 5))
        .await
        .unwrap();
    let ends_soon = store
        .insert_contest(contest_model(ContestStatus::Voting, now - day * 9, now - day))
        .await
        .unwrap();
    let starts_late = store
        .insert_contest(contest_model(ContestStatus::Upcoming, now + day * 8, now + day * 9))
        .await
        .unwrap();
    let starts_soon = store
        .insert_contest(contest_model(ContestStatus::Upcoming, now + day * 2, now + day * 9))
        .await
        .unwrap();
    let ended_long_ago = store
        .insert_contest(contest_model(ContestStatus::Completed, now - day * 30, now - day * 20))
        .await
        .unwrap();
    let ended_recently = store
        .insert_contest(contest_model(ContestStatus::Completed, now - day * 12, now - day * 5))
        .await
        .unwrap();
    store
        .insert_contest(contest_model(ContestStatus::Draft, now, now + day))
        .await
        .unwrap();

    let ids = |list: Vec<contests::Model>| list.into_iter().map(|c| c.id).collect::<Vec<_>>();

    assert_eq!(
        ids(service.list_contests(ContestPhase::ActiveOrVoting).await.unwrap()),
        vec![ends_soon.id, ends_late.id]
    );
    assert_eq!(
        ids(service.list_contests(ContestPhase::Upcoming).await.unwrap()),
        vec![starts_soon.id, starts_late.id]
    );
    assert_eq!(
        ids(service.list_contests(ContestPhase::Completed).await.unwrap()),
        vec![ended_recently.id, ended_long_ago.id]
    );
}

#[tokio::test]
async fn test_weekly_count_uses_trailing_seven_days() {
    let (store, service) = setup();
    let now = Utc::now();
    let user = Uuid::new_v4();

    // One contest per photo: a user holds at most one submission per contest.
    for (owner, created_at) in [
        (user, now - Duration::days(8)),
        (user, now - Duration::days(2)),
        (user, now - Duration::hours(1)),
        (Uuid::new_v4(), now),
    ] {
        let contest = seed_contest(&store, ContestStatus::Active).await;
        store
            .insert_photo(photo_model(contest.id, owner, created_at))
            .await
            .unwrap();
    }

    assert_eq!(service.weekly_submission_count(user, now).await.unwrap(), 2);
    // Photos created after the window's end do not count toward it.
    assert_eq!(
        service
            .weekly_submission_count(user, now - Duration::days(3))
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        service
            .weekly_submission_count(user, now - Duration::days(9))
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_photo_writes_recheck_contest_status_in_store() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let owner = Uuid::new_v4();
    let photo = service
        .submit_photo(submission(contest.id, owner, "Harbour"))
        .await
        .unwrap()
        .photo;
    let voter = Uuid::new_v4();
    service.vote(photo.id, voter, 4.0).await.unwrap();

    // The contest closes between the service's own check and the write.
    store
        .update_contest_status(contest.id, ContestStatus::Voting)
        .await
        .unwrap();

    let deleted = store.delete_photo_cascade(photo.id).await;
    assert!(matches!(deleted, Err(StoreError::ContestClosed)));
    assert!(store.find_photo(photo.id).await.unwrap().is_some());
    assert!(store.find_vote(voter, photo.id).await.unwrap().is_some());

    let updated = store
        .update_photo_content(photo.id, "https://cdn.example.com/late.jpg".into(), None)
        .await;
    assert!(matches!(updated, Err(StoreError::ContestClosed)));
    let stored = store.find_photo(photo.id).await.unwrap().unwrap();
    assert_eq!(stored.image_url, photo.image_url);

    let late = store
        .insert_photo(photo_model(contest.id, Uuid::new_v4(), Utc::now()))
        .await;
    assert!(matches!(late, Err(StoreError::ContestClosed)));
}

#[tokio::test]
async fn test_resubmission_to_closed_contest_is_rejected() {
    let (store, service) = setup();
    let contest = seed_contest(&store, ContestStatus::Active).await;
    let user = Uuid::new_v4();
    let first = service
        .submit_photo(submission(contest.id, user, "Before"))
        .await
        .unwrap()
        .photo;

    service
        .set_contest_status(contest.id, ContestStatus::Voting)
        .await
        .unwrap();

    let again = service.submit_photo(submission(contest.id, user, "After")).await;
    assert!(matches!(again, Err(ServiceError::ContestNotOpen)));
    let stored = store.find_photo(first.id).await.unwrap().unwrap();
    assert_eq!(stored.caption.as_deref(), Some("Before"));
}

#[tokio::test]
async fn test_advance_phases_is_idempotent() {
    let (store, service) = setup();
    let now = Utc::now();
    let day = Duration::days(1);

    let starting = store
        .insert_contest(contest_model(ContestStatus::Upcoming, now - day, now + day))
        .await
        .unwrap();
    let ending = store
        .insert_contest(contest_model(ContestStatus::Active, now - day * 3, now - day))
        .await
        .unwrap();
    let stale = store
        .insert_contest(contest_model(ContestStatus::Upcoming, now - day * 20, now - day * 10))
        .await
        .unwrap();
    let draft = store
        .insert_contest(contest_model(ContestStatus::Draft, now - day * 3, now - day * 2))
        .await
        .unwrap();

    let transitions = service.advance_phases(now).await.unwrap();
    assert_eq!(transitions.len(), 3);

    for (id, expected) in [
        (starting.id, ContestStatus::Active),
        (ending.id, ContestStatus::Voting),
        (stale.id, ContestStatus::Completed),
        (draft.id, ContestStatus::Draft),
    ] {
        let contest = service.get_contest(id).await.unwrap().unwrap();
        assert_eq!(contest.status, expected);
    }

    assert!(service.advance_phases(now).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_contest_validation() {
    let (_store, service) = setup();
    let now = Utc::now();
    let creator = Uuid::new_v4();

    let input = |title: &str, start, end, status| CreateContest {
        title: title.into(),
        description: "Street at night".into(),
        category: Some(Category::Street),
        cover_image_url: None,
        start_date: start,
        end_date: end,
        status,
    };

    let created = service
        .create_contest(creator, input("  Neon  ", now, now + Duration::days(7), None))
        .await
        .unwrap();
    assert_eq!(created.title, "Neon");
    assert_eq!(created.status, ContestStatus::Upcoming);
    assert_eq!(created.created_by, creator);

    let backwards = service
        .create_contest(creator, input("Neon", now, now - Duration::days(1), None))
        .await;
    assert!(matches!(backwards, Err(ServiceError::Validation(_))));

    let untitled = service
        .create_contest(creator, input(" ", now, now + Duration::days(1), None))
        .await;
    assert!(matches!(untitled, Err(ServiceError::Validation(_))));

    let already_active = service
        .create_contest(
            creator,
            input("Neon", now, now + Duration::days(1), Some(ContestStatus::Active)),
        )
        .await;
    assert!(matches!(already_active, Err(ServiceError::Validation(_))));

    let missing = service
        .set_contest_status(Uuid::new_v4(), ContestStatus::Active)
        .await;
    assert!(matches!(missing, Err(ServiceError::ContestNotFound)));
}
