use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Contests {
    Table,
    Status,
}

#[derive(DeriveIden)]
enum Photos {
    Table,
    ContestId,
    UserId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Votes {
    Table,
    PhotoId,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    PhotoId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Phase listings and the scheduler filter contests by status
        manager
            .create_index(
                Index::create()
                    .name("idx_contests_status")
                    .table(Contests::Table)
                    .col(Contests::Status)
                    .to_owned(),
            )
            .await?;

        // Contest photo listings
        manager
            .create_index(
                Index::create()
                    .name("idx_photos_contest_id")
                    .table(Photos::Table)
                    .col(Photos::ContestId)
                    .to_owned(),
            )
            .await?;

        // Weekly quota count: photos by user within a time window
        manager
            .create_index(
                Index::create()
                    .name("idx_photos_user_id_created_at")
                    .table(Photos::Table)
                    .col(Photos::UserId)
                    .col(Photos::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Aggregate recompute reads every vote of a photo
        manager
            .create_index(
                Index::create()
                    .name("idx_votes_photo_id")
                    .table(Votes::Table)
                    .col(Votes::PhotoId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_photo_id")
                    .table(Comments::Table)
                    .col(Comments::PhotoId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_contests_status",
            "idx_photos_contest_id",
            "idx_photos_user_id_created_at",
            "idx_votes_photo_id",
            "idx_comments_photo_id",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
