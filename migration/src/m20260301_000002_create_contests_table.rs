use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Contests {
    Table,
    Id,
    Title,
    Description,
    Category,
    CoverImageUrl,
    Status,
    StartDate,
    EndDate,
    CreatedBy,
    CreatedAt,
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
                    .table(Contests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contests::Title).string().not_null())
                    .col(ColumnDef::new(Contests::Description).text().not_null())
                    .col(
                        ColumnDef::new(Contests::Category)
                            .string()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Contests::CoverImageUrl).string().null())
                    .col(ColumnDef::new(Contests::Status).string().not_null())
                    .col(
                        ColumnDef::new(Contests::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contests::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Contests::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(Contests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contests_created_by")
                            .from(Contests::Table, Contests::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contests::Table).to_owned())
            .await
    }
}
