use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::{SeaOrmStore, conflict_on_unique};
use crate::models::{photos, votes};
use crate::repository::{StoreError, VoteRepository};
use crate::service::rating::rounded_average;

/// Fetch the vote a user cast on a photo, if any.
pub async fn get_vote<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    photo_id: Uuid,
) -> Result<Option<votes::Model>, DbErr> {
    votes::Entity::find()
        .filter(votes::Column::UserId.eq(user_id))
        .filter(votes::Column::PhotoId.eq(photo_id))
        .one(db)
        .await
}

/// Fetch every vote on a photo.
pub async fn get_votes_by_photo<C: ConnectionTrait>(
    db: &C,
    photo_id: Uuid,
) -> Result<Vec<votes::Model>, DbErr> {
    votes::Entity::find()
        .filter(votes::Column::PhotoId.eq(photo_id))
        .all(db)
        .await
}

/// Insert a vote row.
pub async fn insert_vote<C: ConnectionTrait>(
    db: &C,
    vote: votes::Model,
) -> Result<votes::Model, DbErr> {
    let new_vote = votes::ActiveModel {
        id: Set(vote.id),
        photo_id: Set(vote.photo_id),
        user_id: Set(vote.user_id),
        rating: Set(vote.rating),
        created_at: Set(vote.created_at),
    };

    new_vote.insert(db).await
}

#[async_trait]
impl VoteRepository for SeaOrmStore {
    async fn find_vote(
        &self,
        user_id: Uuid,
        photo_id: Uuid,
    ) -> Result<Option<votes::Model>, StoreError> {
        Ok(get_vote(&self.db, user_id, photo_id).await?)
    }

    async fn record_vote(&self, vote: votes::Model) -> Result<photos::Model, StoreError> {
        let txn = self.db.begin().await?;

        // Row lock serialises concurrent votes on the same photo, so the
        // recomputed aggregate always covers every committed vote.
        let photo = photos::Entity::find_by_id(vote.photo_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(StoreError::Missing("photo"))?;

        if get_vote(&txn, vote.user_id, vote.photo_id).await?.is_some() {
            return Err(StoreError::Conflict("vote already recorded".into()));
        }

        insert_vote(&txn, vote)
            .await
            .map_err(|e| conflict_on_unique(e, "vote already recorded"))?;

        let ratings: Vec<i32> = get_votes_by_photo(&txn, photo.id)
            .await?
            .into_iter()
            .map(|v| v.rating)
            .collect();

        let mut active: photos::ActiveModel = photo.into();
        active.average_rating = Set(rounded_average(&ratings));
        active.vote_count = Set(ratings.len() as i32);
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        Ok(updated)
    }
}
