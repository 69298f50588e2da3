use std::sync::Arc;

use tower::util::BoxService;
use tower::{Service, ServiceExt};

use image::GenericImageView;

use crate::analysis::{BleachingDetector, MorphologyAnalyzer};
use crate::config::Configuration;
use crate::enhance::Enhancer;
use crate::error::{AnalysisError, AppError};
use crate::pipeline::context::ReefObservation;
use crate::pipeline::services::{
    EnhanceService, HealthService, IdentifyService, InsightService, MorphologyService,
};
use crate::survey::SurveyFrame;
use crate::taxonomy::SpeciesResolver;

struct Stage {
    name: &'static str,
    service: BoxService<ReefObservation, ReefObservation, AppError>,
}

/// Fixed-order chain of stage services. Morphology must run before
/// identification, and health before insight; `standard` wires that order.
pub struct AnalysisPipeline {
    stages: Vec<Stage>,
}

impl AnalysisPipeline {
    pub fn builder() -> AnalysisPipelineBuilder {
        AnalysisPipelineBuilder { stages: Vec::new() }
    }

    /// The full enhancement-to-insight chain.
    pub fn standard(configuration: &Configuration, resolver: Arc<dyn SpeciesResolver>) -> Self {
        Self::builder()
            .stage("enhance", EnhanceService::new(Enhancer::new()))
            .stage(
                "morphology",
                MorphologyService::new(MorphologyAnalyzer::new()),
            )
            .stage(
                "health",
                HealthService::new(BleachingDetector::new(configuration.sample_step)),
            )
            .stage("identify", IdentifyService::new(resolver))
            .stage("insight", InsightService::new())
            .build()
    }

    pub async fn process(&mut self, frame: SurveyFrame) -> Result<ReefObservation, AppError> {
        let (width, height) = frame.image.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::EmptyImage(width, height).into());
        }

        let mut observation = ReefObservation::new(frame);
        for stage in &mut self.stages {
            tracing::debug!("Processing stage: {}", stage.name);
            observation = stage.service.ready().await?.call(observation).await?;
        }
        Ok(observation)
    }
}

pub struct AnalysisPipelineBuilder {
    stages: Vec<Stage>,
}

impl AnalysisPipelineBuilder {
    pub fn stage<S>(mut self, name: &'static str, service: S) -> Self
    where
        S: Service<ReefObservation, Response = ReefObservation, Error = AppError>
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        self.stages.push(Stage {
            name,
            service: BoxService::new(service),
        });
        self
    }

    pub fn build(self) -> AnalysisPipeline {
        AnalysisPipeline {
            stages: self.stages,
        }
    }
}
