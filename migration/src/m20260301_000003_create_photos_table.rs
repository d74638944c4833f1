use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Photos {
    Table,
    Id,
    ContestId,
    UserId,
    Username,
    ImageUrl,
    Caption,
    AverageRating,
    VoteCount,
    ModerationStatus,
    ModerationNotes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Contests {
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
                    .table(Photos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Photos::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Photos::ContestId).uuid().not_null())
                    .col(ColumnDef::new(Photos::UserId).uuid().not_null())
                    .col(ColumnDef::new(Photos::Username).string().not_null())
                    .col(ColumnDef::new(Photos::ImageUrl).string().not_null())
                    .col(ColumnDef::new(Photos::Caption).string_len(200).null())
                    .col(
                        ColumnDef::new(Photos::AverageRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Photos::VoteCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Photos::ModerationStatus)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Photos::ModerationNotes).text().null())
                    .col(
                        ColumnDef::new(Photos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Photos::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photos_contest_id")
                            .from(Photos::Table, Photos::ContestId)
                            .to(Contests::Table, Contests::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_photos_user_id")
                            .from(Photos::Table, Photos::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One submission per user per contest.
        manager
            .create_index(
                Index::create()
                    .name("uq_photos_user_contest")
                    .table(Photos::Table)
                    .col(Photos::UserId)
                    .col(Photos::ContestId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uq_photos_user_contest").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Photos::Table).to_owned())
            .await
    }
}
