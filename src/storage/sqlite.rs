use std::path::Path;
use rusqlite::{Connection, OptionalExtension};
use anyhow::{Result, Context};
use crate::storage::migrations::apply_migrations;
use crate::storage::KeyValueStore;

pub struct Database {
    connection: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("connection", &"<SQLite Connection>")
            .finish()
    }
}

impl Database {
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {}", parent.display()))?;
        }

        let connection = Connection::open(path)
            .with_context(|| format!("Failed to open database at: {}", path.display()))?;

        connection.execute_batch("
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = memory;
        ").context("Failed to configure SQLite pragmas")?;

        let db = Database { connection };
        db.init_schema()?;

        Ok(db)
    }

    pub fn init_schema(&self) -> Result<()> {
        apply_migrations(&self.connection)
            .context("Failed to apply database migrations")
    }
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.connection
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("Failed to read key: {}", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        self.connection.execute(
            "INSERT OR REPLACE INTO kv_entries (key, value, updated_at) VALUES (?1, ?2, ?3)",
            [key, value, now.as_str()],
        ).with_context(|| format!("Failed to write key: {}", key))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let rows_affected = self.connection.execute(
            "DELETE FROM kv_entries WHERE key = ?1",
            [key],
        ).with_context(|| format!("Failed to delete key: {}", key))?;

        Ok(rows_affected > 0)
    }
}
