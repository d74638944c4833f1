use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::SeaOrmStore;
use crate::models::contests::{self, ContestStatus};
use crate::repository::{ContestRepository, StoreError};

/// Insert a fully built contest.
pub async fn insert_contest<C: ConnectionTrait>(
    db: &C,
    contest: contests::Model,
) -> Result<contests::Model, DbErr> {
    let new_contest = contests::ActiveModel {
        id: Set(contest.id),
        title: Set(contest.title),
        description: Set(contest.description),
        category: Set(contest.category),
        cover_image_url: Set(contest.cover_image_url),
        status: Set(contest.status),
        start_date: Set(contest.start_date),
        end_date: Set(contest.end_date),
        created_by: Set(contest.created_by),
        created_at: Set(contest.created_at),
    };

    new_contest.insert(db).await
}

/// Fetch every contest whose status is in `statuses`.
pub async fn get_contests_by_status<C: ConnectionTrait>(
    db: &C,
    statuses: &[ContestStatus],
) -> Result<Vec<contests::Model>, DbErr> {
    contests::Entity::find()
        .filter(contests::Column::Status.is_in(statuses.iter().copied()))
        .all(db)
        .await
}

/// Fetch a single contest by ID.
pub async fn get_contest_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<contests::Model>, DbErr> {
    contests::Entity::find_by_id(id).one(db).await
}

/// Set the status of a contest. Returns `None` if it does not exist.
pub async fn update_contest_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: ContestStatus,
) -> Result<Option<contests::Model>, DbErr> {
    let Some(contest) = contests::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: contests::ActiveModel = contest.into();
    active.status = Set(status);

    active.update(db).await.map(Some)
}

#[async_trait]
impl ContestRepository for SeaOrmStore {
    async fn contests_with_status(
        &self,
        statuses: &[ContestStatus],
    ) -> Result<Vec<contests::Model>, StoreError> {
        Ok(get_contests_by_status(&self.db, statuses).await?)
    }

    async fn find_contest(&self, id: Uuid) -> Result<Option<contests::Model>, StoreError> {
        Ok(get_contest_by_id(&self.db, id).await?)
    }

    async fn insert_contest(
        &self,
        contest: contests::Model,
    ) -> Result<contests::Model, StoreError> {
        Ok(insert_contest(&self.db, contest).await?)
    }

    async fn update_contest_status(
        &self,
        id: Uuid,
        status: ContestStatus,
    ) -> Result<Option<contests::Model>, StoreError> {
        Ok(update_contest_status(&self.db, id, status).await?)
    }
}
