use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use super::{SeaOrmStore, conflict_on_unique};
use crate::models::users::{self, CompleteProfile, CreateUserFromAuth, UpdateMembership};
use crate::repository::{StoreError, UserRepository};

/// Find a user by auth UUID, creating it from JWT claims on first sight.
///
/// A username already held by another account is left unset rather than
/// failing the request; the user can pick one when completing the profile.
pub async fn find_or_create_from_auth<C: ConnectionTrait>(
    db: &C,
    mut input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    if let Some(username) = &input.username {
        let taken = users::Entity::find()
            .filter(users::Column::Username.eq(username.as_str()))
            .one(db)
            .await?
            .is_some();
        if taken {
            input.username = None;
        }
    }

    new_user(input).insert(db).await
}

fn new_user(input: CreateUserFromAuth) -> users::ActiveModel {
    users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        username: Set(input.username),
        display_name: Set(input.display_name),
        avatar_url: Set(input.avatar_url),
        role: Set(input.role),
        is_premium: Set(false),
        max_submissions_per_week: Set(input.max_submissions_per_week),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    }
}

/// Fetch a single user by ID.
pub async fn get_user_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

/// Complete a user's profile (username, display name, avatar).
pub async fn complete_profile<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: CompleteProfile,
) -> Result<users::Model, DbErr> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();

    if let Some(username) = input.username {
        active.username = Set(Some(username));
    }
    if let Some(display_name) = input.display_name {
        active.display_name = Set(Some(display_name));
    }
    if let Some(avatar_url) = input.avatar_url {
        active.avatar_url = Set(Some(avatar_url));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Change a user's premium flag and weekly quota.
pub async fn update_membership<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: UpdateMembership,
) -> Result<users::Model, DbErr> {
    let user = users::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

    let mut active: users::ActiveModel = user.into();

    if let Some(is_premium) = input.is_premium {
        active.is_premium = Set(is_premium);
    }
    if let Some(quota) = input.max_submissions_per_week {
        active.max_submissions_per_week = Set(quota);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

fn user_store_error(e: DbErr) -> StoreError {
    match e {
        DbErr::RecordNotFound(_) => StoreError::Missing("user"),
        other => conflict_on_unique(other, "username already taken"),
    }
}

#[async_trait]
impl UserRepository for SeaOrmStore {
    async fn find_or_create_user(
        &self,
        input: CreateUserFromAuth,
    ) -> Result<users::Model, StoreError> {
        let id = input.id;
        let fallback = CreateUserFromAuth {
            username: None,
            ..input.clone()
        };

        match find_or_create_from_auth(&self.db, input).await {
            Ok(user) => Ok(user),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // A concurrent first request for the same account won the
                // insert, or another account took the username in between.
                if let Some(existing) = get_user_by_id(&self.db, id).await? {
                    return Ok(existing);
                }
                tracing::debug!(user_id = %id, "Username taken during provisioning, leaving it unset");
                new_user(fallback)
                    .insert(&self.db)
                    .await
                    .map_err(|e| conflict_on_unique(e, "email already registered"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<users::Model>, StoreError> {
        Ok(get_user_by_id(&self.db, id).await?)
    }

    async fn complete_profile(
        &self,
        id: Uuid,
        input: CompleteProfile,
    ) -> Result<users::Model, StoreError> {
        complete_profile(&self.db, id, input)
            .await
            .map_err(user_store_error)
    }

    async fn update_membership(
        &self,
        id: Uuid,
        input: UpdateMembership,
    ) -> Result<users::Model, StoreError> {
        update_membership(&self.db, id, input)
            .await
            .map_err(user_store_error)
    }
}
