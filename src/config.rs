use std::path::PathBuf;

use serde::Deserialize;

use crate::error::AppError;

/// How much work each frame gets. Mirrors the survey workflows the field
/// teams actually run: a fast pass over a dive's footage, the default
/// per-colony analysis, or a dense scan for publication data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisDepth {
    QuickScan,
    Detailed,
    ResearchGrade,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub survey_dir: PathBuf,
    pub output_dir: PathBuf,
    pub database_url: String,
    pub frame_buffer_size: usize,
    pub depth: AnalysisDepth,
    /// Drop frames whose perceptual hash was already seen this run.
    pub dedup_frames: bool,
    pub dedup_capacity: usize,
    pub dedup_fp_rate: f64,
    /// Persist completed analyses to the database.
    pub persist_analyses: bool,
    /// Pixel stride for palette sampling. Lower is slower and more accurate.
    pub sample_step: u32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            survey_dir: PathBuf::from("survey"),
            output_dir: PathBuf::from("reports"),
            database_url: "sqlite://reefscan.db?mode=rwc".to_string(),
            frame_buffer_size: 60,
            depth: AnalysisDepth::Detailed,
            dedup_frames: true,
            dedup_capacity: 10_000,
            dedup_fp_rate: 0.01,
            persist_analyses: true,
            sample_step: 4,
        }
    }
}

impl Configuration {
    /// Layered load: defaults, then an optional `reefscan.toml`, then
    /// `REEFSCAN_`-prefixed environment variables.
    pub fn load() -> Result<Self, AppError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("reefscan").required(false))
            .add_source(config::Environment::with_prefix("REEFSCAN").try_parsing(true))
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        let mut configuration: Configuration = settings
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))?;
        configuration.apply_depth();
        configuration.validate().map_err(AppError::Config)?;
        Ok(configuration)
    }

    /// Fast pass: coarse sampling, no dedup bookkeeping, nothing persisted.
    pub fn quick_scan() -> Self {
        Self {
            depth: AnalysisDepth::QuickScan,
            dedup_frames: false,
            persist_analyses: false,
            sample_step: 8,
            ..Self::default()
        }
    }

    /// Default per-colony analysis.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Dense sampling for survey datasets that feed downstream research.
    pub fn research_grade() -> Self {
        Self {
            depth: AnalysisDepth::ResearchGrade,
            sample_step: 2,
            ..Self::default()
        }
    }

    // Aligns the tunables with the selected depth when the depth came from
    // file or environment rather than a preset constructor.
    fn apply_depth(&mut self) {
        match self.depth {
            AnalysisDepth::QuickScan => {
                self.sample_step = self.sample_step.max(8);
                self.dedup_frames = false;
                self.persist_analyses = false;
            }
            AnalysisDepth::Detailed => {}
            AnalysisDepth::ResearchGrade => {
                self.sample_step = self.sample_step.min(2);
            }
        }
    }

    pub fn survey_dir(mut self, survey_dir: PathBuf) -> Self {
        self.survey_dir = survey_dir;
        self
    }

    pub fn output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn database_url(mut self, database_url: String) -> Self {
        self.database_url = database_url;
        self
    }

    pub fn frame_buffer_size(mut self, frame_buffer_size: usize) -> Self {
        self.frame_buffer_size = frame_buffer_size;
        self
    }

    pub fn persist_analyses(mut self, persist_analyses: bool) -> Self {
        self.persist_analyses = persist_analyses;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.survey_dir.as_os_str().is_empty() {
            return Err("Survey directory must be set".to_string());
        }

        if self.frame_buffer_size == 0 {
            return Err("Frame buffer size must be greater than 0".to_string());
        }

        if self.sample_step == 0 {
            return Err("Sample step must be greater than 0".to_string());
        }

        if self.dedup_fp_rate <= 0.0 || self.dedup_fp_rate >= 1.0 {
            return Err("Dedup false-positive rate must be between 0.0 and 1.0".to_string());
        }

        if self.dedup_capacity == 0 {
            return Err("Dedup capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert!(Configuration::default().validate().is_ok());
    }

    #[test]
    fn quick_scan_disables_persistence_and_dedup() {
        let configuration = Configuration::quick_scan();
        assert!(!configuration.persist_analyses);
        assert!(!configuration.dedup_frames);
        assert_eq!(configuration.sample_step, 8);
        assert!(configuration.validate().is_ok());
    }

    #[test]
    fn research_grade_samples_densely() {
        let configuration = Configuration::research_grade();
        assert_eq!(configuration.sample_step, 2);
        assert_eq!(configuration.depth, AnalysisDepth::ResearchGrade);
    }

    #[test]
    fn zero_sample_step_is_rejected() {
        let configuration = Configuration {
            sample_step: 0,
            ..Configuration::default()
        };
        assert!(configuration.validate().is_err());
    }
}
