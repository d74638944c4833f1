use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Votes {
    Table,
    Id,
    PhotoId,
    UserId,
    Rating,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Photos {
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
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Votes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Votes::PhotoId).uuid().not_null())
                    .col(ColumnDef::new(Votes::UserId).uuid().not_null())
                    .col(ColumnDef::new(Votes::Rating).integer().not_null())
                    .col(
                        ColumnDef::new(Votes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_photo_id")
                            .from(Votes::Table, Votes::PhotoId)
                            .to(Photos::Table, Photos::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_user_id")
                            .from(Votes::Table, Votes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One vote per user per photo.
        manager
            .create_index(
                Index::create()
                    .name("uq_votes_user_photo")
                    .table(Votes::Table)
                    .col(Votes::UserId)
                    .col(Votes::PhotoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uq_votes_user_photo").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await
    }
}
