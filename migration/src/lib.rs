pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_users_table;
mod m20260301_000002_create_contests_table;
mod m20260301_000003_create_photos_table;
mod m20260301_000004_create_votes_table;
mod m20260301_000005_create_comments_table;
mod m20260302_000001_add_indexes;
mod m20260303_000001_create_comment_flags_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_users_table::Migration),
            Box::new(m20260301_000002_create_contests_table::Migration),
            Box::new(m20260301_000003_create_photos_table::Migration),
            Box::new(m20260301_000004_create_votes_table::Migration),
            Box::new(m20260301_000005_create_comments_table::Migration),
            Box::new(m20260302_000001_add_indexes::Migration),
            Box::new(m20260303_000001_create_comment_flags_table::Migration),
        ]
    }
}
