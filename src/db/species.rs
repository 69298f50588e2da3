//! Species reference table access.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use tracing::info;

use crate::error::AppError;
use crate::taxonomy::catalog::GROWTH_FORM_MATCH_CONFIDENCE;
use crate::taxonomy::{
    BleachingResistance, ConservationStatus, GrowthForm, SpeciesCatalog, SpeciesMatch,
    SpeciesRecord, SpeciesResolver,
};

/// Populates the species table from the built-in catalog when it is empty.
pub async fn seed_if_empty(
    pool: &Pool<Sqlite>,
    catalog: &SpeciesCatalog,
) -> Result<(), sqlx::Error> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coral_species")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    for record in catalog.iter() {
        sqlx::query(
            r#"
            INSERT INTO coral_species
            (common_name, scientific_name, family, genus, growth_form,
             bleaching_resistance, conservation_status, color_patterns,
             typical_size_cm, field_marks)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.common_name)
        .bind(&record.scientific_name)
        .bind(&record.family)
        .bind(&record.genus)
        .bind(record.growth_form.label())
        .bind(record.bleaching_resistance.label())
        .bind(record.conservation_status.label())
        .bind(&record.color_patterns)
        .bind(record.typical_size_cm as i64)
        .bind(&record.field_marks)
        .execute(pool)
        .await?;
    }

    info!("Seeded species table with {} records", catalog.len());
    Ok(())
}

pub async fn count(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM coral_species")
        .fetch_one(pool)
        .await
}

pub async fn all(pool: &Pool<Sqlite>) -> Result<Vec<SpeciesRecord>, sqlx::Error> {
    let rows = sqlx::query("SELECT * FROM coral_species ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(record_from_row).collect())
}

pub async fn find_by_growth_form(
    pool: &Pool<Sqlite>,
    growth_form: GrowthForm,
) -> Result<Option<SpeciesRecord>, sqlx::Error> {
    let row = sqlx::query("SELECT * FROM coral_species WHERE growth_form = ? ORDER BY id LIMIT 1")
        .bind(growth_form.label())
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(record_from_row))
}

async fn first(pool: &Pool<Sqlite>) -> Result<Option<SpeciesRecord>, sqlx::Error> {
    let row = sqlx::query("SELECT * FROM coral_species ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(record_from_row))
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> SpeciesRecord {
    SpeciesRecord {
        common_name: row.get("common_name"),
        scientific_name: row.get("scientific_name"),
        family: row.get("family"),
        genus: row.get("genus"),
        growth_form: GrowthForm::from_label(row.get::<String, _>("growth_form").as_str()),
        bleaching_resistance: BleachingResistance::from_label(
            row.get::<String, _>("bleaching_resistance").as_str(),
        ),
        conservation_status: ConservationStatus::from_label(
            row.get::<String, _>("conservation_status").as_str(),
        ),
        color_patterns: row.get("color_patterns"),
        typical_size_cm: row.get::<i64, _>("typical_size_cm") as u32,
        field_marks: row.get("field_marks"),
    }
}

/// Species identification backed by the store rather than the in-process
/// catalog, for deployments that manage the reference table externally.
pub struct StoreResolver {
    pool: Pool<Sqlite>,
}

impl StoreResolver {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpeciesResolver for StoreResolver {
    async fn resolve(&self, growth_form: GrowthForm) -> Result<Option<SpeciesMatch>, AppError> {
        let record = match find_by_growth_form(&self.pool, growth_form)
            .await
            .map_err(crate::error::StoreError::Database)?
        {
            Some(record) => Some(record),
            None => first(&self.pool)
                .await
                .map_err(crate::error::StoreError::Database)?,
        };
        Ok(record.map(|species| SpeciesMatch {
            species,
            confidence: GROWTH_FORM_MATCH_CONFIDENCE,
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::db::Store;

    use super::*;

    #[tokio::test]
    async fn seeded_rows_round_trip() {
        let store = Store::in_memory().await.unwrap();
        let species = all(store.pool()).await.unwrap();
        assert_eq!(species.len(), 9);
        assert_eq!(species[0].common_name, "Staghorn Coral");
        assert_eq!(species[0].growth_form, GrowthForm::Branching);
        assert_eq!(
            species[8].conservation_status,
            ConservationStatus::DataDeficient
        );
    }

    #[tokio::test]
    async fn store_resolver_matches_growth_form() {
        let store = Store::in_memory().await.unwrap();
        let resolver = StoreResolver::new(store.pool().clone());

        let matched = resolver
            .resolve(GrowthForm::PlateTable)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(matched.species.common_name, "Table Coral");

        // No encrusting entry exists; the resolver answers with the leading
        // record like the catalog does.
        let fallback = resolver
            .resolve(GrowthForm::Encrusting)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fallback.species.common_name, "Staghorn Coral");
    }
}
