use image::RgbImage;

use crate::analysis::core::AnalysisContext;
use crate::analysis::health::HealthAssessment;
use crate::analysis::morphology::MorphologyReport;
use crate::db::StoredAnalysis;
use crate::error::AnalysisError;
use crate::insight::InsightReport;
use crate::survey::SurveyFrame;
use crate::taxonomy::SpeciesMatch;

/// One survey frame on its way through the pipeline, accumulating stage
/// outputs as it goes.
#[derive(Clone)]
pub struct ReefObservation {
    pub frame: SurveyFrame,
    pub enhanced: Option<RgbImage>,
    pub morphology: Option<MorphologyReport>,
    pub health: Option<HealthAssessment>,
    pub species: Option<SpeciesMatch>,
    pub insights: Option<InsightReport>,
}

impl ReefObservation {
    pub fn new(frame: SurveyFrame) -> Self {
        Self {
            frame,
            enhanced: None,
            morphology: None,
            health: None,
            species: None,
            insights: None,
        }
    }

    /// Analysis context over the enhanced image when enhancement ran,
    /// otherwise over the original frame.
    pub fn analysis_context(&self) -> AnalysisContext {
        let context = AnalysisContext::new(&self.frame.image);
        match &self.enhanced {
            Some(enhanced) => context.with_working(enhanced.clone()),
            None => context,
        }
    }

    pub fn morphology(&self) -> Result<&MorphologyReport, AnalysisError> {
        self.morphology
            .as_ref()
            .ok_or(AnalysisError::MissingStage("morphology"))
    }

    pub fn health(&self) -> Result<&HealthAssessment, AnalysisError> {
        self.health
            .as_ref()
            .ok_or(AnalysisError::MissingStage("health"))
    }

    pub fn insights(&self) -> Result<&InsightReport, AnalysisError> {
        self.insights
            .as_ref()
            .ok_or(AnalysisError::MissingStage("insight"))
    }

    /// Flattens a completed observation into its database row.
    pub fn to_stored(&self) -> Result<StoredAnalysis, AnalysisError> {
        let health = self.health()?;
        let insights = self.insights()?;

        Ok(StoredAnalysis {
            filename: self.frame.file_name(),
            analyzed_at: self.frame.captured_at,
            predicted_species: self
                .species
                .as_ref()
                .map(|m| m.species.common_name.clone()),
            species_confidence: self.species.as_ref().map(|m| m.confidence as f64),
            health_status: health.status.label().to_string(),
            health_confidence: health.confidence as f64,
            bleaching_percentage: health.bleaching_percentage as f64,
            family: self.species.as_ref().map(|m| m.species.family.clone()),
            genus: self.species.as_ref().map(|m| m.species.genus.clone()),
            insights: insights.summary.clone(),
        })
    }
}
