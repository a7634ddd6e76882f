//! # Database Migrations
//!
//! SQL files under `migrations/sqlite/` embedded at compile time.
//!
//! ```text
//! Database::new ──► run_migrations ──► _sqlx_migrations checked
//!                                          │
//!                                          ├── 001_discount_codes.sql       ✓
//!                                          └── 002_discount_code_usage.sql  ⬜ run
//! ```
//!
//! New migrations get the next sequence number. Applied files are never
//! edited.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
