use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum CommentFlags {
    Table,
    Id,
    CommentId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CommentFlags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommentFlags::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommentFlags::CommentId).uuid().not_null())
                    .col(ColumnDef::new(CommentFlags::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(CommentFlags::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_flags_comment_id")
                            .from(CommentFlags::Table, CommentFlags::CommentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_flags_user_id")
                            .from(CommentFlags::Table, CommentFlags::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One flag per user per comment.
        manager
            .create_index(
                Index::create()
                    .name("uq_comment_flags_comment_user")
                    .table(CommentFlags::Table)
                    .col(CommentFlags::CommentId)
                    .col(CommentFlags::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("uq_comment_flags_comment_user")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(CommentFlags::Table).to_owned())
            .await
    }
}
