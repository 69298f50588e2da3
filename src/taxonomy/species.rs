use serde::{Deserialize, Serialize};

/// Colony growth form. This is what shape analysis can actually see in a
/// single frame, and the pivot between morphology and species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthForm {
    Branching,
    PlateTable,
    Plate,
    Boulder,
    Encrusting,
    Soft,
    Unknown,
}

impl GrowthForm {
    pub fn label(&self) -> &'static str {
        match self {
            GrowthForm::Branching => "Branching",
            GrowthForm::PlateTable => "Plate/Table",
            GrowthForm::Plate => "Plate",
            GrowthForm::Boulder => "Boulder",
            GrowthForm::Encrusting => "Encrusting",
            GrowthForm::Soft => "Soft",
            GrowthForm::Unknown => "Unknown",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Branching" => GrowthForm::Branching,
            "Plate/Table" => GrowthForm::PlateTable,
            "Plate" => GrowthForm::Plate,
            "Boulder" => GrowthForm::Boulder,
            "Encrusting" => GrowthForm::Encrusting,
            "Soft" => GrowthForm::Soft,
            _ => GrowthForm::Unknown,
        }
    }
}

impl std::fmt::Display for GrowthForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BleachingResistance {
    Low,
    Medium,
    High,
}

impl BleachingResistance {
    pub fn label(&self) -> &'static str {
        match self {
            BleachingResistance::Low => "Low",
            BleachingResistance::Medium => "Medium",
            BleachingResistance::High => "High",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "High" => BleachingResistance::High,
            "Medium" => BleachingResistance::Medium,
            _ => BleachingResistance::Low,
        }
    }
}

impl std::fmt::Display for BleachingResistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// IUCN-style conservation listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationStatus {
    LeastConcern,
    NearThreatened,
    Vulnerable,
    CriticallyEndangered,
    DataDeficient,
}

impl ConservationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConservationStatus::LeastConcern => "Least Concern",
            ConservationStatus::NearThreatened => "Near Threatened",
            ConservationStatus::Vulnerable => "Vulnerable",
            ConservationStatus::CriticallyEndangered => "Critically Endangered",
            ConservationStatus::DataDeficient => "Data Deficient",
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label {
            "Least Concern" => ConservationStatus::LeastConcern,
            "Near Threatened" => ConservationStatus::NearThreatened,
            "Vulnerable" => ConservationStatus::Vulnerable,
            "Critically Endangered" => ConservationStatus::CriticallyEndangered,
            _ => ConservationStatus::DataDeficient,
        }
    }
}

impl std::fmt::Display for ConservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One species entry with full taxonomy and field guidance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub common_name: String,
    pub scientific_name: String,
    pub family: String,
    pub genus: String,
    pub growth_form: GrowthForm,
    pub bleaching_resistance: BleachingResistance,
    pub conservation_status: ConservationStatus,
    pub color_patterns: String,
    pub typical_size_cm: u32,
    /// What a surveyor looks for in the water.
    pub field_marks: String,
}

/// A species identification with its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesMatch {
    pub species: SpeciesRecord,
    pub confidence: f32,
}
