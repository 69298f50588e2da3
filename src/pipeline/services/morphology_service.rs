use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tower::Service;

use crate::analysis::MorphologyAnalyzer;
use crate::error::AppError;
use crate::pipeline::context::ReefObservation;

/// Pipeline stage that measures colony shape and attaches the growth form.
#[derive(Clone)]
pub struct MorphologyService {
    analyzer: Arc<MorphologyAnalyzer>,
}

impl MorphologyService {
    pub fn new(analyzer: MorphologyAnalyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}

impl Service<ReefObservation> for MorphologyService {
    type Response = ReefObservation;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut observation: ReefObservation) -> Self::Future {
        let context = observation.analysis_context();
        let outcome = self.analyzer.analyze(&context);
        tracing::debug!("{}: {}", observation.frame.file_name(), outcome.reasoning);
        observation.morphology = Some(outcome.result);

        Box::pin(async move { Ok(observation) })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use image::{DynamicImage, ImageBuffer, Rgb};
    use tower::ServiceExt;

    use crate::survey::SurveyFrame;
    use crate::taxonomy::GrowthForm;

    use super::*;

    #[tokio::test]
    async fn attaches_a_morphology_report() {
        // Dark slab on bright water.
        let image = ImageBuffer::from_fn(64, 64, |x, y| {
            if (2..62).contains(&x) && (26..38).contains(&y) {
                Rgb([90u8, 60, 30])
            } else {
                Rgb([180u8, 200, 220])
            }
        });
        let observation = ReefObservation::new(SurveyFrame::new(
            DynamicImage::ImageRgb8(image),
            PathBuf::from("slab.png"),
        ));

        let service = MorphologyService::new(MorphologyAnalyzer::new());
        let result = service.oneshot(observation).await.unwrap();
        let report = result.morphology.expect("morphology missing");
        assert_eq!(report.growth_form, GrowthForm::PlateTable);
    }
}
