use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::contests::{self, ContestPhase, ContestStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    pub contest_id: Uuid,
    pub from: ContestStatus,
    pub to: ContestStatus,
}

/// The status a contest should be in at `now`, or `None` if it should stay put.
///
/// `draft` is never advanced automatically and `completed` is terminal. A
/// contest whose dates have all passed jumps straight to `completed`.
pub fn target_status(
    contest: &contests::Model,
    now: DateTime<Utc>,
    voting_period: Duration,
) -> Option<ContestStatus> {
    if matches!(
        contest.status,
        ContestStatus::Draft | ContestStatus::Completed
    ) {
        return None;
    }

    let target = if now >= contest.end_date + voting_period {
        ContestStatus::Completed
    } else if now >= contest.end_date {
        ContestStatus::Voting
    } else if now >= contest.start_date {
        ContestStatus::Active
    } else {
        ContestStatus::Upcoming
    };

    // Phases only move forward.
    (rank(target) > rank(contest.status)).then_some(target)
}

fn rank(status: ContestStatus) -> u8 {
    match status {
        ContestStatus::Draft => 0,
        ContestStatus::Upcoming => 1,
        ContestStatus::Active => 2,
        ContestStatus::Voting => 3,
        ContestStatus::Completed => 4,
    }
}

/// Sort contests the way each phase listing is presented.
pub fn sort_for_phase(phase: ContestPhase, contests: &mut [contests::Model]) {
    match phase {
        ContestPhase::ActiveOrVoting => contests.sort_by_key(|c| c.end_date),
        ContestPhase::Upcoming => contests.sort_by_key(|c| c.start_date),
        ContestPhase::Completed => contests.sort_by(|a, b| b.end_date.cmp(&a.end_date)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contests::Category;

    fn contest(status: ContestStatus, start: DateTime<Utc>, end: DateTime<Utc>) -> contests::Model {
        contests::Model {
            id: Uuid::new_v4(),
            title: "Golden hour".into(),
            description: String::new(),
            category: Category::Landscape,
            cover_image_url: None,
            status,
            start_date: start,
            end_date: end,
            created_by: Uuid::new_v4(),
            created_at: start,
        }
    }

    #[test]
    fn walks_forward_through_phases() {
        let now = Utc::now();
        let week = Duration::days(7);
        let voting = Duration::hours(72);

        let future = contest(ContestStatus::Upcoming, now + week, now + week * 2);
        assert_eq!(target_status(&future, now, voting), None);

        let started = contest(ContestStatus::Upcoming, now - week, now + week);
        assert_eq!(
            target_status(&started, now, voting),
            Some(ContestStatus::Active)
        );

        let ended = contest(ContestStatus::Active, now - week, now - Duration::hours(1));
        assert_eq!(
            target_status(&ended, now, voting),
            Some(ContestStatus::Voting)
        );

        let long_gone = contest(ContestStatus::Upcoming, now - week * 3, now - week * 2);
        assert_eq!(
            target_status(&long_gone, now, voting),
            Some(ContestStatus::Completed)
        );
    }

    #[test]
    fn draft_and_manual_overrides_are_left_alone() {
        let now = Utc::now();
        let voting = Duration::hours(72);

        let draft = contest(ContestStatus::Draft, now - Duration::days(1), now + Duration::days(1));
        assert_eq!(target_status(&draft, now, voting), None);

        // Moved to voting early by an admin: dates say active, but never go back.
        let early = contest(ContestStatus::Voting, now - Duration::days(1), now + Duration::days(1));
        assert_eq!(target_status(&early, now, voting), None);
    }
}
