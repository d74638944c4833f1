//! Profanity screening and comment flag escalation.
//!
//! Run with: `cargo test --test moderation_test`
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use photo_contest_backend::error::ServiceError;
use photo_contest_backend::models::comments::CommentStatus;
use photo_contest_backend::models::contests::{self, Category, ContestStatus};
use photo_contest_backend::moderation::comments::CommentService;
use photo_contest_backend::moderation::profanity::contains_profanity;
use photo_contest_backend::moderation::{AutoApprove, ProfanityFilter};
use photo_contest_backend::repository::{ContestRepository, Repositories};
use photo_contest_backend::service::{ContestService, NewSubmission};
use photo_contest_backend::store::MemoryStore;

#[test]
fn test_base_words_match_in_both_modes() {
    assert!(contains_profanity("What a stupid angle", false));
    assert!(contains_profanity("What a stupid angle", true));
    assert!(contains_profanity("DAMN that light", false));
}

#[test]
fn test_strict_words_only_match_in_strict_mode() {
    assert!(!contains_profanity("this composition sucks", false));
    assert!(contains_profanity("this composition sucks", true));
    assert!(contains_profanity("please SHUT  UP about bokeh", true));
}

#[test]
fn test_substrings_do_not_match() {
    let filter = ProfanityFilter::new(&["class"], &["hell"]);

    assert!(filter.contains_profanity("a class act", false));
    assert!(!filter.contains_profanity("a classic shot", false));
    assert!(!filter.contains_profanity("hello there", true));
    assert!(!filter.contains_profanity("shellfish at dawn", true));
    assert!(filter.contains_profanity("hell, yes", true));
}

struct Fixture {
    comments: CommentService,
    photo_id: Uuid,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let repos = Repositories::from_store(store.clone());
    let contests = ContestService::new(&repos, Arc::new(AutoApprove), Duration::hours(72));

    let now = Utc::now();
    let contest = store
        .insert_contest(contests::Model {
            id: Uuid::new_v4(),
            title: "Rain".into(),
            description: String::new(),
            category: Category::Street,
            cover_image_url: None,
            status: ContestStatus::Active,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(1),
            created_by: Uuid::new_v4(),
            created_at: now,
        })
        .await
        .unwrap();

    let photo = contests
        .submit_photo(NewSubmission {
            contest_id: contest.id,
            user_id: Uuid::new_v4(),
            username: "puddles".into(),
            image_url: "https://cdn.example.com/rain.jpg".into(),
            caption: None,
        })
        .await
        .unwrap()
        .photo;

    Fixture {
        comments: CommentService::new(&repos, Arc::new(ProfanityFilter::default())),
        photo_id: photo.id,
    }
}

#[tokio::test]
async fn test_comment_text_is_validated() {
    let fx = fixture().await;
    let user = Uuid::new_v4();

    let empty = fx.comments.add_comment(fx.photo_id, user, "kim".into(), "   ").await;
    assert!(matches!(empty, Err(ServiceError::Validation(_))));

    let long = "a".repeat(501);
    let too_long = fx.comments.add_comment(fx.photo_id, user, "kim".into(), &long).await;
    assert!(matches!(too_long, Err(ServiceError::Validation(_))));

    let rude = fx
        .comments
        .add_comment(fx.photo_id, user, "kim".into(), "you idiot")
        .await;
    match rude {
        Err(ServiceError::Validation(message)) => {
            assert_eq!(message, "Comment contains inappropriate language")
        }
        other => panic!("expected a validation error, got {other:?}"),
    }

    let orphan = fx
        .comments
        .add_comment(Uuid::new_v4(), user, "kim".into(), "Lovely tones")
        .await;
    assert!(matches!(orphan, Err(ServiceError::PhotoNotFound)));
}

#[tokio::test]
async fn test_comments_list_oldest_first() {
    let fx = fixture().await;

    for text in ["First!", "Great reflections", "Which lens?"] {
        fx.comments
            .add_comment(fx.photo_id, Uuid::new_v4(), "kim".into(), text)
            .await
            .unwrap();
    }

    let texts: Vec<String> = fx
        .comments
        .list_comments(fx.photo_id)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.text)
        .collect();
    assert_eq!(texts, vec!["First!", "Great reflections", "Which lens?"]);
}

#[tokio::test]
async fn test_second_flag_applies_strict_check() {
    let fx = fixture().await;
    let comment = fx
        .comments
        .add_comment(fx.photo_id, Uuid::new_v4(), "kim".into(), "honestly this sucks")
        .await
        .unwrap();

    let once = fx
        .comments
        .flag_comment(comment.id, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(once.flag_count, 1);
    assert_eq!(once.status, CommentStatus::Visible);

    let twice = fx
        .comments
        .flag_comment(comment.id, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(twice.flag_count, 2);
    assert_eq!(twice.status, CommentStatus::Removed);

    assert!(fx.comments.list_comments(fx.photo_id).await.unwrap().is_empty());

    // Removed comments can no longer be flagged.
    let again = fx.comments.flag_comment(comment.id, Uuid::new_v4()).await;
    assert!(matches!(again, Err(ServiceError::CommentNotFound)));
}

#[tokio::test]
async fn test_third_flag_removes_regardless_of_text() {
    let fx = fixture().await;
    let comment = fx
        .comments
        .add_comment(fx.photo_id, Uuid::new_v4(), "kim".into(), "Beautiful colours")
        .await
        .unwrap();

    for expected in [CommentStatus::Visible, CommentStatus::Visible, CommentStatus::Removed] {
        let flagged = fx
            .comments
            .flag_comment(comment.id, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(flagged.status, expected);
    }

    let missing = fx
        .comments
        .flag_comment(Uuid::new_v4(), Uuid::new_v4())
        .await;
    assert!(matches!(missing, Err(ServiceError::CommentNotFound)));
}

#[tokio::test]
async fn test_repeat_flags_from_one_user_count_once() {
    let fx = fixture().await;
    let comment = fx
        .comments
        .add_comment(fx.photo_id, Uuid::new_v4(), "kim".into(), "Nice framing")
        .await
        .unwrap();
    let critic = Uuid::new_v4();

    let first = fx.comments.flag_comment(comment.id, critic).await.unwrap();
    assert_eq!(first.flag_count, 1);

    for _ in 0..3 {
        let repeat = fx.comments.flag_comment(comment.id, critic).await;
        assert!(matches!(repeat, Err(ServiceError::AlreadyFlagged)));
    }

    let listed = fx.comments.list_comments(fx.photo_id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].flag_count, 1);
    assert_eq!(listed[0].status, CommentStatus::Visible);
}
