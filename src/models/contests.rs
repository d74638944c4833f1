use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contest lifecycle status stored as a lowercase string in the database.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "voting")]
    Voting,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[sea_orm(string_value = "landscape")]
    Landscape,
    #[sea_orm(string_value = "portrait")]
    Portrait,
    #[sea_orm(string_value = "wildlife")]
    Wildlife,
    #[sea_orm(string_value = "street")]
    Street,
    #[sea_orm(string_value = "macro")]
    Macro,
    #[sea_orm(string_value = "architecture")]
    Architecture,
    #[sea_orm(string_value = "black_and_white")]
    BlackAndWhite,
    #[sea_orm(string_value = "other")]
    Other,
}

impl Category {
    pub fn id(&self) -> &'static str {
        match self {
            Category::Landscape => "landscape",
            Category::Portrait => "portrait",
            Category::Wildlife => "wildlife",
            Category::Street => "street",
            Category::Macro => "macro",
            Category::Architecture => "architecture",
            Category::BlackAndWhite => "black_and_white",
            Category::Other => "other",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Landscape => "Landscape",
            Category::Portrait => "Portrait",
            Category::Wildlife => "Wildlife",
            Category::Street => "Street",
            Category::Macro => "Macro",
            Category::Architecture => "Architecture",
            Category::BlackAndWhite => "Black & White",
            Category::Other => "Other",
        }
    }
}

/// SeaORM entity for the `contests` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub category: Category,
    pub cover_image_url: Option<String>,
    pub status: ContestStatus,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::photos::Entity")]
    Photos,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
}

impl Related<super::photos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Phase filter accepted by `GET /api/contests?phase=...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestPhase {
    ActiveOrVoting,
    Upcoming,
    Completed,
}

impl ContestPhase {
    pub fn statuses(&self) -> &'static [ContestStatus] {
        match self {
            ContestPhase::ActiveOrVoting => &[ContestStatus::Active, ContestStatus::Voting],
            ContestPhase::Upcoming => &[ContestStatus::Upcoming],
            ContestPhase::Completed => &[ContestStatus::Completed],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestListQuery {
    pub phase: Option<ContestPhase>,
}

impl ContestListQuery {
    pub fn phase(&self) -> ContestPhase {
        self.phase.unwrap_or(ContestPhase::ActiveOrVoting)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateContest {
    pub title: String,
    pub description: String,
    pub category: Option<Category>,
    pub cover_image_url: Option<String>,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub status: Option<ContestStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateContestStatus {
    pub status: ContestStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub id: &'static str,
    pub name: &'static str,
}

/// Contest as returned by the API, with the category expanded to id + name.
#[derive(Debug, Clone, Serialize)]
pub struct ContestResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: CategoryRef,
    pub cover_image_url: Option<String>,
    pub status: ContestStatus,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub created_by: Uuid,
    pub created_at: DateTimeUtc,
}

impl From<Model> for ContestResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            category: CategoryRef {
                id: m.category.id(),
                name: m.category.name(),
            },
            cover_image_url: m.cover_image_url,
            status: m.status,
            start_date: m.start_date,
            end_date: m.end_date,
            created_by: m.created_by,
            created_at: m.created_at,
        }
    }
}
