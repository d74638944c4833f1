pub mod comments;
pub mod profanity;

use crate::models::comments::CommentStatus;
use crate::models::photos::{self, ModerationStatus};

pub use profanity::ProfanityFilter;

/// Decides how a freshly submitted photo enters moderation.
pub trait ModerationService: Send + Sync {
    fn initial_status(&self, photo: &photos::Model) -> ModerationStatus;
}

/// Publishes every submission immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

impl ModerationService for AutoApprove {
    fn initial_status(&self, _photo: &photos::Model) -> ModerationStatus {
        ModerationStatus::Approved
    }
}

/// Holds every submission for manual review.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualReview;

impl ModerationService for ManualReview {
    fn initial_status(&self, _photo: &photos::Model) -> ModerationStatus {
        ModerationStatus::Pending
    }
}

/// Flags at or beyond this count remove a comment unconditionally.
pub const AUTO_REMOVE_FLAGS: i32 = 3;

/// Status a comment ends up in after receiving its `flag_count`-th flag.
pub fn escalate(flag_count: i32, text: &str, filter: &ProfanityFilter) -> CommentStatus {
    let offensive = match flag_count {
        n if n >= AUTO_REMOVE_FLAGS => true,
        2 => filter.contains_profanity(text, true),
        1 => filter.contains_profanity(text, false),
        _ => false,
    };

    if offensive {
        CommentStatus::Removed
    } else {
        CommentStatus::Visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escalation_tightens_with_each_flag() {
        let filter = ProfanityFilter::new(&["darn"], &["meh"]);

        assert_eq!(escalate(1, "meh shot", &filter), CommentStatus::Visible);
        assert_eq!(escalate(2, "meh shot", &filter), CommentStatus::Removed);
        assert_eq!(escalate(1, "darn it", &filter), CommentStatus::Removed);
        assert_eq!(escalate(AUTO_REMOVE_FLAGS, "lovely light", &filter), CommentStatus::Removed);
        assert_eq!(escalate(2, "lovely light", &filter), CommentStatus::Visible);
    }
}
