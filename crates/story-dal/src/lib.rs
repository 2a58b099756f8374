pub mod category;
pub mod error;
pub mod story;

use std::{collections::HashSet, str::FromStr as _};

pub use error::Error;
use sqlx::{
    migrate::{Migrate as _, MigrateError, Migrator},
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use tracing::info;

use crate::error::Result;

pub type ChosenDB = sqlx::Sqlite;
pub type Pool = sqlx::Pool<ChosenDB>;

pub const MAX_LIMIT: usize = 10_000;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn new_pool(database_url: &str) -> Result<Pool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(50)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Applies all pending migrations.
pub async fn migrate(pool: &Pool) -> Result<()> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationDirection {
    Up,
    Down,
}

/// Applies up to `steps` pending migrations in version order, or reverts up to `steps`
/// applied ones starting from the newest. Returns number of migrations processed.
pub async fn migrate_steps(
    pool: &Pool,
    direction: MigrationDirection,
    steps: usize,
) -> Result<usize> {
    let mut conn = pool.acquire().await?;
    conn.lock().await?;
    conn.ensure_migrations_table().await?;
    if let Some(version) = conn.dirty_version().await? {
        return Err(MigrateError::Dirty(version).into());
    }

    let applied: HashSet<i64> = conn
        .list_applied_migrations()
        .await?
        .into_iter()
        .map(|m| m.version)
        .collect();

    let mut processed = 0;
    match direction {
        MigrationDirection::Up => {
            for migration in MIGRATOR
                .iter()
                .filter(|m| m.migration_type.is_up_migration())
                .filter(|m| !applied.contains(&m.version))
                .take(steps)
            {
                let elapsed = conn.apply(migration).await?;
                info!(
                    version = migration.version,
                    ?elapsed,
                    "Applied migration {}",
                    migration.description
                );
                processed += 1;
            }
        }
        MigrationDirection::Down => {
            for migration in MIGRATOR
                .iter()
                .rev()
                .filter(|m| m.migration_type.is_down_migration())
                .filter(|m| applied.contains(&m.version))
                .take(steps)
            {
                let elapsed = conn.revert(migration).await?;
                info!(
                    version = migration.version,
                    ?elapsed,
                    "Reverted migration {}",
                    migration.description
                );
                processed += 1;
            }
        }
    }

    conn.unlock().await?;
    Ok(processed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingParams {
    pub offset: i64,
    pub limit: i64,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: MAX_LIMIT as i64,
        }
    }
}

impl ListingParams {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Page numbers start at 1.
    pub fn from_page(page: i64, limit: i64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(limit);
        Self { offset, limit }
    }
}
