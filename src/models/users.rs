use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `Roles` enum maps to a Postgres TEXT column stored as lowercase strings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Roles {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(unique)]
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Roles,
    pub is_premium: bool,
    pub max_submissions_per_week: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl Model {
    /// Name shown next to submissions and comments.
    pub fn public_name(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.display_name.clone())
            .unwrap_or_else(|| self.email.split('@').next().unwrap_or_default().to_string())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Roles::Admin
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::photos::Entity")]
    Photos,
    #[sea_orm(has_many = "super::votes::Entity")]
    Votes,
}

impl Related<super::photos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Photos.def()
    }
}

impl Related<super::votes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Votes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs (not stored in DB, used for request bodies) ──

/// Used internally by the auth middleware to provision a user from JWT claims.
#[derive(Debug, Clone)]
pub struct CreateUserFromAuth {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Roles,
    pub max_submissions_per_week: i32,
}

/// Used by the `POST /api/auth/complete-profile` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteProfile {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Admin-only change to a user's membership tier and quota.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMembership {
    pub is_premium: Option<bool>,
    pub max_submissions_per_week: Option<i32>,
}

/// The authenticated user's own view, including quota usage.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Roles,
    pub is_premium: bool,
    pub max_submissions_per_week: i32,
    pub submissions_this_week: u64,
    /// `None` for premium users, who are not bound by the weekly quota.
    pub remaining_submissions: Option<u64>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl UserResponse {
    pub fn new(m: Model, submissions_this_week: u64) -> Self {
        let remaining_submissions = (!m.is_premium).then(|| {
            (m.max_submissions_per_week.max(0) as u64).saturating_sub(submissions_this_week)
        });

        Self {
            id: m.id,
            email: m.email,
            username: m.username,
            display_name: m.display_name,
            avatar_url: m.avatar_url,
            role: m.role,
            is_premium: m.is_premium,
            max_submissions_per_week: m.max_submissions_per_week,
            submissions_this_week,
            remaining_submissions,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// A safe user representation for other users (never leaks email or quota).
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub is_premium: bool,
    pub created_at: DateTimeUtc,
}

impl From<Model> for PublicUser {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            display_name: m.display_name,
            avatar_url: m.avatar_url,
            is_premium: m.is_premium,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklySubmissions {
    pub user_id: Uuid,
    pub count: u64,
    pub window_days: i64,
}
