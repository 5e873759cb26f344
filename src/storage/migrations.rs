use rusqlite::Connection;
use anyhow::{Result, Context};

pub struct Migration {
    pub version: i32,
    pub name: &'static str,
    pub sql: &'static str,
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "kv_entries",
        sql: include_str!("../../migrations/001_initial.sql"),
    },
];

pub fn get_schema_version(connection: &Connection) -> Result<i32> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
        [],
    ).context("Failed to create schema_version table")?;

    // No rows yet means a fresh database
    let version = connection.query_row(
        "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
        [],
        |row| row.get::<_, i32>(0)
    ).unwrap_or(0);

    Ok(version)
}

pub fn apply_migrations(connection: &Connection) -> Result<()> {
    let current_version = get_schema_version(connection)?;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::debug!(version = migration.version, name = migration.name, "Applying migration");

            connection.execute_batch(migration.sql)
                .with_context(|| format!("Failed to apply migration {}", migration.version))?;

            connection.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [migration.version],
            ).with_context(|| format!("Failed to update schema version to {}", migration.version))?;
        }
    }

    Ok(())
}
