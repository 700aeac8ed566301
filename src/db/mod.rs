pub mod entities;
pub mod error;
pub mod migrations;
pub mod services;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use crate::db::migrations::Migrator;

/// Opens the connection pool and brings the schema up to date.
///
/// An in-memory SQLite database only exists for as long as its connection
/// does, so such URLs are pinned to a single long-lived connection.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    if database_url.contains(":memory:") {
        opt.max_connections(1)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(u32::MAX as u64))
            .max_lifetime(Duration::from_secs(u32::MAX as u64));
    } else {
        opt.max_connections(max_connections)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(5));
    }
    opt.sqlx_logging(false);

    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;
    info!("Database connected and migrations applied.");
    Ok(db)
}
