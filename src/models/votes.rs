use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `votes` table. One row per (user, photo).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "votes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub photo_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::photos::Entity",
        from = "Column::PhotoId",
        to = "super::photos::Column::Id"
    )]
    Photo,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Voter,
}

impl Related<super::photos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photo.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Voter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for `POST /api/photos/{id}/votes`.
///
/// The rating is taken as a float so that non-integer input reaches the rules
/// engine and is rejected there instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CastVote {
    pub rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserVoteResponse {
    pub photo_id: Uuid,
    pub rating: Option<u8>,
}
