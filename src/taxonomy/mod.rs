pub mod catalog;
pub mod species;

pub use catalog::{CatalogResolver, SpeciesCatalog, SpeciesResolver};
pub use species::{
    BleachingResistance, ConservationStatus, GrowthForm, SpeciesMatch, SpeciesRecord,
};
