//! SQLite persistence: the species reference table and completed analyses.

pub mod analyses;
pub mod species;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::error::StoreError;
use crate::taxonomy::SpeciesCatalog;

pub use analyses::StoredAnalysis;
pub use species::StoreResolver;

#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Opens the database, creates missing tables, and seeds the species
    /// reference data on first run.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        // A single connection keeps writes serialized and makes
        // `sqlite::memory:` behave (every connection would otherwise get its
        // own empty database).
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.create_tables().await?;
        species::seed_if_empty(store.pool(), &SpeciesCatalog::builtin()).await?;
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    async fn create_tables(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS coral_species (
                id INTEGER PRIMARY KEY,
                common_name TEXT NOT NULL,
                scientific_name TEXT NOT NULL,
                family TEXT NOT NULL,
                genus TEXT NOT NULL,
                growth_form TEXT NOT NULL,
                bleaching_resistance TEXT NOT NULL,
                conservation_status TEXT NOT NULL,
                color_patterns TEXT NOT NULL,
                typical_size_cm INTEGER NOT NULL,
                field_marks TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                analyzed_at TEXT NOT NULL,
                predicted_species TEXT,
                species_confidence REAL,
                health_status TEXT NOT NULL,
                health_confidence REAL NOT NULL,
                bleaching_percentage REAL NOT NULL,
                family TEXT,
                genus TEXT,
                insights_json TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
