use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Moderation state controlling whether a photo is publicly listed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

/// SeaORM entity for the `photos` table.
///
/// `average_rating` and `vote_count` are derived from the `votes` table and are
/// only ever written by the vote recompute path.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "photos")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub contest_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub image_url: String,
    pub caption: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub average_rating: f64,
    pub vote_count: i32,
    pub moderation_status: ModerationStatus,
    #[sea_orm(column_type = "Text", nullable)]
    pub moderation_notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contests::Entity",
        from = "Column::ContestId",
        to = "super::contests::Column::Id"
    )]
    Contest,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::contests::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contest.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for `POST /api/contests/{id}/photos`.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitPhoto {
    pub image_url: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModeratePhoto {
    pub status: ModerationStatus,
    pub notes: Option<String>,
}
