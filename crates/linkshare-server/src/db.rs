// File: src/db.rs
// Purpose: SQLite storage for shares
//
// The store is an explicit handle carried by the request context; nothing here
// is global.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use uuid::Uuid;

use crate::share::Share;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS shares (
        id BLOB PRIMARY KEY NOT NULL,
        created TEXT NOT NULL,
        path TEXT NOT NULL,
        name TEXT,
        expiry TEXT
    )
"#;

/// Handle to the share database
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (or create) `<data_path>/linkshare.db`
    pub async fn open(data_path: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_path)
            .with_context(|| format!("Failed to create data directory: {:?}", data_path))?;
        let file = data_path.join("linkshare.db");

        let options = SqliteConnectOptions::new()
            .filename(&file)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("Failed to open database: {:?}", file))?;

        let store = Self { pool };
        store.migrate().await.context("Failed to create schema")?;
        Ok(store)
    }

    /// Private in-memory database
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        // One connection that never expires, or the database vanishes with it
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a share inside a transaction
    pub async fn insert(&self, share: &Share) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO shares (id, created, path, name, expiry) VALUES (?, ?, ?, ?, ?)")
            .bind(share.id)
            .bind(share.created)
            .bind(&share.path)
            .bind(&share.name)
            .bind(share.expiry)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(share_id = %share.id, path = %share.path, "share stored");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Share>, sqlx::Error> {
        sqlx::query_as::<_, Share>(
            "SELECT id, created, path, name, expiry FROM shares WHERE id = ? LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Ids of every share, oldest first
    pub async fn list_ids(&self) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM shares ORDER BY created, rowid")
            .fetch_all(&self.pool)
            .await
    }

    /// Every share, oldest first
    pub async fn all(&self) -> Result<Vec<Share>, sqlx::Error> {
        sqlx::query_as::<_, Share>(
            "SELECT id, created, path, name, expiry FROM shares ORDER BY created, rowid",
        )
        .fetch_all(&self.pool)
        .await
    }
}
