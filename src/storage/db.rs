use anyhow::{Context, Result};
use async_trait::async_trait;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use std::path::Path;

use super::mirror::MirrorCache;
use crate::entities::mirror_entry;
use crate::repositories::MirrorRepository;

/// SQLite-backed local storage for the mirror cache
pub struct LocalStorage {
    pub conn: DatabaseConnection,
}

impl LocalStorage {
    /// Open (creating if needed) the mirror database at `path`.
    ///
    /// The path `:memory:` opens a private in-memory database instead.
    pub async fn open(path: &Path) -> Result<Self> {
        if path.as_os_str() == ":memory:" {
            return Self::in_memory().await;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create mirror directory: {}", parent.display()))?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", path.display());
        Self::connect(database_url, 4)
            .await
            .with_context(|| format!("Failed to open mirror database: {}", path.display()))
    }

    /// Initialize an in-memory database, mostly useful for tests.
    pub async fn in_memory() -> Result<Self> {
        // Every pooled connection would get its own empty database
        Self::connect("sqlite::memory:".to_string(), 1).await
    }

    async fn connect(database_url: String, max_connections: u32) -> Result<Self> {
        let mut options = ConnectOptions::new(database_url);
        options
            .min_connections(1)
            .max_connections(max_connections)
            .sqlx_logging(false);

        let conn = Database::connect(options).await?;
        let storage = LocalStorage { conn };
        storage.init_schema().await?;

        Ok(storage)
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut create_mirror = schema.create_table_from_entity(mirror_entry::Entity);
        create_mirror.if_not_exists();
        self.conn.execute(backend.build(&create_mirror)).await?;

        Ok(())
    }

    /// Clear all data from the database
    pub async fn clear_all_data(&self) -> Result<()> {
        mirror_entry::Entity::delete_many().exec(&self.conn).await?;
        Ok(())
    }
}

#[async_trait]
impl MirrorCache for LocalStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(MirrorRepository::get(&self.conn, key).await?.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        MirrorRepository::upsert(&self.conn, key, value).await
    }
}
