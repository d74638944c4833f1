use async_trait::async_trait;
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use super::{SeaOrmStore, conflict_on_unique};
use crate::models::comment_flags;
use crate::models::comments::{self, CommentStatus};
use crate::repository::{CommentRepository, StoreError};

/// Insert a new comment.
pub async fn insert_comment<C: ConnectionTrait>(
    db: &C,
    comment: comments::Model,
) -> Result<comments::Model, DbErr> {
    let new_comment = comments::ActiveModel {
        id: Set(comment.id),
        photo_id: Set(comment.photo_id),
        user_id: Set(comment.user_id),
        username: Set(comment.username),
        text: Set(comment.text),
        flag_count: Set(comment.flag_count),
        status: Set(comment.status),
        created_at: Set(comment.created_at),
    };

    new_comment.insert(db).await
}

/// Fetch a single comment by ID.
pub async fn get_comment_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<comments::Model>, DbErr> {
    comments::Entity::find_by_id(id).one(db).await
}

/// Fetch visible comments on a photo, oldest first.
pub async fn get_visible_comments<C: ConnectionTrait>(
    db: &C,
    photo_id: Uuid,
) -> Result<Vec<comments::Model>, DbErr> {
    comments::Entity::find()
        .filter(comments::Column::PhotoId.eq(photo_id))
        .filter(comments::Column::Status.eq(CommentStatus::Visible))
        .order_by_asc(comments::Column::CreatedAt)
        .order_by_asc(comments::Column::Id)
        .all(db)
        .await
}

/// Insert a flag row. The unique index on `(comment_id, user_id)` rejects a
/// second flag from the same user.
pub async fn insert_flag<C: ConnectionTrait>(
    db: &C,
    comment_id: Uuid,
    user_id: Uuid,
) -> Result<comment_flags::Model, DbErr> {
    let new_flag = comment_flags::ActiveModel {
        id: Set(Uuid::new_v4()),
        comment_id: Set(comment_id),
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
    };

    new_flag.insert(db).await
}

/// Bump the flag counter in a single statement and return the fresh row.
pub async fn increment_flag_count<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<comments::Model>, DbErr> {
    let result = comments::Entity::update_many()
        .col_expr(comments::Column::FlagCount, Expr::cust("flag_count + 1"))
        .filter(comments::Column::Id.eq(id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    get_comment_by_id(db, id).await
}

/// Set the moderation status of a comment.
pub async fn update_comment_status<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    status: CommentStatus,
) -> Result<Option<comments::Model>, DbErr> {
    let Some(comment) = comments::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };

    let mut active: comments::ActiveModel = comment.into();
    active.status = Set(status);

    active.update(db).await.map(Some)
}

#[async_trait]
impl CommentRepository for SeaOrmStore {
    async fn insert_comment(
        &self,
        comment: comments::Model,
    ) -> Result<comments::Model, StoreError> {
        Ok(insert_comment(&self.db, comment).await?)
    }

    async fn find_comment(&self, id: Uuid) -> Result<Option<comments::Model>, StoreError> {
        Ok(get_comment_by_id(&self.db, id).await?)
    }

    async fn visible_comments(
        &self,
        photo_id: Uuid,
    ) -> Result<Vec<comments::Model>, StoreError> {
        Ok(get_visible_comments(&self.db, photo_id).await?)
    }

    async fn record_flag(
        &self,
        comment_id: Uuid,
        user_id: Uuid,
    ) -> Result<comments::Model, StoreError> {
        let txn = self.db.begin().await?;

        if get_comment_by_id(&txn, comment_id).await?.is_none() {
            return Err(StoreError::Missing("comment"));
        }
        insert_flag(&txn, comment_id, user_id)
            .await
            .map_err(|e| conflict_on_unique(e, "comment already flagged by this user"))?;
        let comment = increment_flag_count(&txn, comment_id)
            .await?
            .ok_or(StoreError::Missing("comment"))?;

        txn.commit().await?;
        Ok(comment)
    }

    async fn set_comment_status(
        &self,
        id: Uuid,
        status: CommentStatus,
    ) -> Result<comments::Model, StoreError> {
        update_comment_status(&self.db, id, status)
            .await?
            .ok_or(StoreError::Missing("comment"))
    }
}
