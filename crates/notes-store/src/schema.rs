//! Embedded schema and migration runner.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the notes table (001_notes.sql).
pub const NOTES_MIGRATION: &str = include_str!("../migrations/001_notes.sql");

/// Apply the notes schema.
///
/// Every statement is guarded with `IF NOT EXISTS`, so this is safe to run
/// against a database whose table was provisioned by the hosting platform.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(NOTES_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::Migration(format!("Notes migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}
