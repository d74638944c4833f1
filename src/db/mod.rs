pub mod comments;
pub mod contests;
pub mod photos;
pub mod users;
pub mod votes;

use sea_orm::{Database, DatabaseConnection, DbErr, SqlErr};

use crate::repository::StoreError;

/// Create a SeaORM database connection pool.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Postgres-backed implementation of every repository trait.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Turn a unique-index violation into `StoreError::Conflict`.
pub(crate) fn conflict_on_unique(e: DbErr, what: &str) -> StoreError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => StoreError::Conflict(what.to_string()),
        _ => StoreError::Db(e),
    }
}
