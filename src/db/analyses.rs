//! Completed-analysis rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Row, Sqlite};

use crate::error::StoreError;

/// One saved frame analysis, as stored in the `analyses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub filename: String,
    pub analyzed_at: DateTime<Utc>,
    pub predicted_species: Option<String>,
    pub species_confidence: Option<f64>,
    pub health_status: String,
    pub health_confidence: f64,
    pub bleaching_percentage: f64,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub insights: Vec<String>,
}

/// Inserts one analysis and returns its row id.
pub async fn save(pool: &Pool<Sqlite>, analysis: &StoredAnalysis) -> Result<i64, StoreError> {
    let insights_json = serde_json::to_string(&analysis.insights)?;

    let result = sqlx::query(
        r#"
        INSERT INTO analyses
        (filename, analyzed_at, predicted_species, species_confidence,
         health_status, health_confidence, bleaching_percentage, family,
         genus, insights_json)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&analysis.filename)
    .bind(analysis.analyzed_at)
    .bind(&analysis.predicted_species)
    .bind(analysis.species_confidence)
    .bind(&analysis.health_status)
    .bind(analysis.health_confidence)
    .bind(analysis.bleaching_percentage)
    .bind(&analysis.family)
    .bind(&analysis.genus)
    .bind(insights_json)
    .execute(pool)
    .await
    .map_err(StoreError::Database)?;

    Ok(result.last_insert_rowid())
}

/// All saved analyses, newest first.
pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<StoredAnalysis>, StoreError> {
    let rows = sqlx::query("SELECT * FROM analyses ORDER BY analyzed_at DESC, id DESC")
        .fetch_all(pool)
        .await
        .map_err(StoreError::Database)?;

    rows.iter()
        .map(|row| {
            let insights: Vec<String> =
                serde_json::from_str(row.get::<String, _>("insights_json").as_str())?;
            Ok(StoredAnalysis {
                filename: row.get("filename"),
                analyzed_at: row.get("analyzed_at"),
                predicted_species: row.get("predicted_species"),
                species_confidence: row.get("species_confidence"),
                health_status: row.get("health_status"),
                health_confidence: row.get("health_confidence"),
                bleaching_percentage: row.get("bleaching_percentage"),
                family: row.get("family"),
                genus: row.get("genus"),
                insights,
            })
        })
        .collect()
}

pub async fn count(pool: &Pool<Sqlite>) -> Result<i64, StoreError> {
    sqlx::query_scalar("SELECT COUNT(*) FROM analyses")
        .fetch_one(pool)
        .await
        .map_err(StoreError::Database)
}
