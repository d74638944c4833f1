use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use super::{SeaOrmStore, conflict_on_unique};
use crate::models::photos::{self, ModerationStatus};
use crate::models::contests::{self, ContestStatus};
use crate::models::{comments, votes};
use crate::repository::{PhotoRepository, StoreError};

/// Insert a new photo. The unique index on `(user_id, contest_id)` rejects a
/// second submission by the same user.
pub async fn insert_photo<C: ConnectionTrait>(
    db: &C,
    photo: photos::Model,
) -> Result<photos::Model, DbErr> {
    let new_photo = photos::ActiveModel {
        id: Set(photo.id),
        contest_id: Set(photo.contest_id),
        user_id: Set(photo.user_id),
        username: Set(photo.username),
        image_url: Set(photo.image_url),
        caption: Set(photo.caption),
        average_rating: Set(photo.average_rating),
        vote_count: Set(photo.vote_count),
        moderation_status: Set(photo.moderation_status),
        moderation_notes: Set(photo.moderation_notes),
        created_at: Set(photo.created_at),
        updated_at: Set(photo.updated_at),
    };

    new_photo.insert(db).await
}

/// Share-lock the contest row for the rest of the transaction and report
/// whether it is still `Active`. A status change has to wait for the lock, so
/// the answer holds until commit.
pub async fn lock_active_contest<C: ConnectionTrait>(
    db: &C,
    contest_id: Uuid,
) -> Result<bool, DbErr> {
    let contest = contests::Entity::find_by_id(contest_id)
        .lock_shared()
        .one(db)
        .await?;
    Ok(contest.is_some_and(|c| c.status == ContestStatus::Active))
}

/// Fetch a photo and hold an exclusive row lock on it.
pub async fn lock_photo<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<photos::Model>, DbErr> {
    photos::Entity::find_by_id(id).lock_exclusive().one(db).await
}

/// Fetch a single photo by ID.
pub async fn get_photo_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<photos::Model>, DbErr> {
    photos::Entity::find_by_id(id).one(db).await
}

/// Fetch a user's submission to a contest, if any.
pub async fn get_photo_by_user_and_contest<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    contest_id: Uuid,
) -> Result<Option<photos::Model>, DbErr> {
    photos::Entity::find()
        .filter(photos::Column::UserId.eq(user_id))
        .filter(photos::Column::ContestId.eq(contest_id))
        .one(db)
        .await
}

/// Fetch a contest's photos in one moderation state, oldest first.
pub async fn get_photos_by_contest<C: ConnectionTrait>(
    db: &C,
    contest_id: Uuid,
    status: ModerationStatus,
) -> Result<Vec<photos::Model>, DbErr> {
    photos::Entity::find()
        .filter(photos::Column::ContestId.eq(contest_id))
        .filter(photos::Column::ModerationStatus.eq(status))
        .order_by_asc(photos::Column::CreatedAt)
        .order_by_asc(photos::Column::Id)
        .all(db)
        .await
}

/// Replace the image and, when given, the caption of a photo.
pub async fn update_photo_content<C: ConnectionTrait>(
    db: &C,
    photo: photos::Model,
    image_url: String,
    caption: Option<String>,
) -> Result<photos::Model, DbErr> {
    let mut active: photos::ActiveModel = photo.into();
    active.image_url = Set(image_url);
    if let Some(caption) = caption {
        active.caption = Set(Some(caption));
    }
    active.updated_at = Set(Some(Utc::now()));

    active.update(db).await
}

/// Set the moderation status and notes of a photo.
pub async fn update_moderation<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: ModerationStatus,
    notes: Option<String>,
) -> Result<photos::Model, DbErr> {
    let photo = photos::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DbErr::RecordNotFound("Photo not found".to_string()))?;

    let mut active: photos::ActiveModel = photo.into();
    active.moderation_status = Set(status);
    active.moderation_notes = Set(notes);
    active.updated_at = Set(Some(Utc::now()));

    active.update(db).await
}

/// Count the photos a user created between `since` and `until`, inclusive.
pub async fn count_photos_between<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<u64, DbErr> {
    photos::Entity::find()
        .filter(photos::Column::UserId.eq(user_id))
        .filter(photos::Column::CreatedAt.gte(since))
        .filter(photos::Column::CreatedAt.lte(until))
        .count(db)
        .await
}

fn missing_as_store_error(e: DbErr) -> StoreError {
    match e {
        DbErr::RecordNotFound(_) => StoreError::Missing("photo"),
        other => StoreError::Db(other),
    }
}

#[async_trait]
impl PhotoRepository for SeaOrmStore {
    async fn find_photo(&self, id: Uuid) -> Result<Option<photos::Model>, StoreError> {
        Ok(get_photo_by_id(&self.db, id).await?)
    }

    async fn find_submission(
        &self,
        user_id: Uuid,
        contest_id: Uuid,
    ) -> Result<Option<photos::Model>, StoreError> {
        Ok(get_photo_by_user_and_contest(&self.db, user_id, contest_id).await?)
    }

    async fn photos_in_contest(
        &self,
        contest_id: Uuid,
        status: ModerationStatus,
    ) -> Result<Vec<photos::Model>, StoreError> {
        Ok(get_photos_by_contest(&self.db, contest_id, status).await?)
    }

    async fn insert_photo(&self, photo: photos::Model) -> Result<photos::Model, StoreError> {
        let txn = self.db.begin().await?;

        if !lock_active_contest(&txn, photo.contest_id).await? {
            return Err(StoreError::ContestClosed);
        }
        let inserted = insert_photo(&txn, photo)
            .await
            .map_err(|e| conflict_on_unique(e, "user already has a photo in this contest"))?;

        txn.commit().await?;
        Ok(inserted)
    }

    async fn update_photo_content(
        &self,
        id: Uuid,
        image_url: String,
        caption: Option<String>,
    ) -> Result<photos::Model, StoreError> {
        let txn = self.db.begin().await?;

        let photo = lock_photo(&txn, id)
            .await?
            .ok_or(StoreError::Missing("photo"))?;
        if !lock_active_contest(&txn, photo.contest_id).await? {
            return Err(StoreError::ContestClosed);
        }
        let updated = update_photo_content(&txn, photo, image_url, caption).await?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn delete_photo_cascade(&self, id: Uuid) -> Result<bool, StoreError> {
        let txn = self.db.begin().await?;

        let Some(photo) = lock_photo(&txn, id).await? else {
            txn.rollback().await?;
            return Ok(false);
        };
        if !lock_active_contest(&txn, photo.contest_id).await? {
            txn.rollback().await?;
            return Err(StoreError::ContestClosed);
        }

        // Flags go with their comments through the foreign key cascade.
        votes::Entity::delete_many()
            .filter(votes::Column::PhotoId.eq(id))
            .exec(&txn)
            .await?;
        comments::Entity::delete_many()
            .filter(comments::Column::PhotoId.eq(id))
            .exec(&txn)
            .await?;
        let result = photos::Entity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(false);
        }

        txn.commit().await?;
        Ok(true)
    }

    async fn update_moderation(
        &self,
        id: Uuid,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<photos::Model, StoreError> {
        update_moderation(&self.db, id, status, notes)
            .await
            .map_err(missing_as_store_error)
    }

    async fn count_photos_between(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        Ok(count_photos_between(&self.db, user_id, since, until).await?)
    }
}
