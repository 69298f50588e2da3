//! JSON report output, one file per analyzed frame.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::health::HealthAssessment;
use crate::analysis::morphology::MorphologyReport;
use crate::error::{AnalysisError, ReportError};
use crate::insight::InsightReport;
use crate::pipeline::ReefObservation;
use crate::taxonomy::SpeciesMatch;

/// Serializable flattening of a completed observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub frame_id: Uuid,
    pub source: PathBuf,
    pub analyzed_at: DateTime<Utc>,
    pub morphology: MorphologyReport,
    pub health: HealthAssessment,
    pub species: Option<SpeciesMatch>,
    pub insights: InsightReport,
}

impl AnalysisReport {
    pub fn from_observation(observation: &ReefObservation) -> Result<Self, AnalysisError> {
        Ok(Self {
            frame_id: observation.frame.id,
            source: observation.frame.source.clone(),
            analyzed_at: observation.frame.captured_at,
            morphology: *observation.morphology()?,
            health: *observation.health()?,
            species: observation.species.clone(),
            insights: observation.insights()?.clone(),
        })
    }
}

/// Writes pretty-printed reports into the output directory.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Returns the path of the written report.
    pub async fn write(&self, report: &AnalysisReport) -> Result<PathBuf, ReportError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ReportError::WriteError(e, self.output_dir.clone()))?;

        let path = self.output_dir.join(format!("{}.json", report.frame_id));
        let bytes = serde_json::to_vec_pretty(report)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ReportError::WriteError(e, path.clone()))?;
        Ok(path)
    }
}
