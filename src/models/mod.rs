pub mod comment_flags;
pub mod comments;
pub mod contests;
pub mod photos;
pub mod users;
pub mod votes;
