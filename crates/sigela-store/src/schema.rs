//! Schema definitions and migration utilities.
//!
//! The migration creates the tables and every stored function the service
//! calls. It is idempotent and runs on first connection when enabled.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL (001_sigela.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_sigela.sql");

/// Stored functions the PostgreSQL store relies on.
pub const REQUIRED_FUNCTIONS: &[&str] = &[
    "auth_get_user_by_username_role",
    "get_user_by_id",
    "reservation_deliver",
    "reservation_return",
    "reservations_upcoming_by_user",
    "reservations_history_by_user",
    "notifications_list_by_user",
    "notifications_create",
    "notifications_mark_read",
];

/// Run the migration against the database.
///
/// # Errors
///
/// Returns an error if the migration fails to execute.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationError(format!("Schema migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Names from [`REQUIRED_FUNCTIONS`] that do not exist in the database.
pub async fn missing_functions(pool: &PgPool) -> StoreResult<Vec<String>> {
    let mut missing = Vec::new();
    for name in REQUIRED_FUNCTIONS {
        let exists: (bool,) =
            sqlx::query_as(r#"SELECT EXISTS (SELECT FROM pg_proc WHERE proname = $1)"#)
                .bind(name)
                .fetch_one(pool)
                .await?;
        if !exists.0 {
            missing.push((*name).to_string());
        }
    }
    Ok(missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_defines_tables() {
        assert!(SCHEMA_MIGRATION.contains("CREATE TABLE IF NOT EXISTS users"));
        assert!(SCHEMA_MIGRATION.contains("CREATE TABLE IF NOT EXISTS reservations"));
        assert!(SCHEMA_MIGRATION.contains("CREATE TABLE IF NOT EXISTS notifications"));
    }

    #[test]
    fn migration_defines_every_required_function() {
        for name in REQUIRED_FUNCTIONS {
            let needle = format!("CREATE OR REPLACE FUNCTION {}(", name);
            assert!(SCHEMA_MIGRATION.contains(&needle), "missing {}", name);
        }
    }

    #[test]
    fn mark_read_is_scoped_to_owner() {
        assert!(SCHEMA_MIGRATION.contains("WHERE id = p_id AND owner_id = p_user_id"));
    }
}
