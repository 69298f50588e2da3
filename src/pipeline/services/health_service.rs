use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tower::Service;

use crate::analysis::BleachingDetector;
use crate::error::AppError;
use crate::pipeline::context::ReefObservation;

/// Pipeline stage that grades bleaching.
#[derive(Clone)]
pub struct HealthService {
    detector: Arc<BleachingDetector>,
}

impl HealthService {
    pub fn new(detector: BleachingDetector) -> Self {
        Self {
            detector: Arc::new(detector),
        }
    }
}

impl Service<ReefObservation> for HealthService {
    type Response = ReefObservation;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut observation: ReefObservation) -> Self::Future {
        let mut context = observation.analysis_context();
        let outcome = self.detector.assess(&mut context);
        tracing::debug!("{}: {}", observation.frame.file_name(), outcome.reasoning);
        observation.health = Some(outcome.result);

        Box::pin(async move { Ok(observation) })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use image::{DynamicImage, ImageBuffer, Rgb};
    use tower::ServiceExt;

    use crate::analysis::HealthStatus;
    use crate::survey::SurveyFrame;

    use super::*;

    #[tokio::test]
    async fn grades_a_bleached_frame() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(32, 32, Rgb([240, 240, 238])));
        let observation =
            ReefObservation::new(SurveyFrame::new(image, PathBuf::from("pale.png")));

        let service = HealthService::new(BleachingDetector::new(2));
        let result = service.oneshot(observation).await.unwrap();
        let health = result.health.expect("health missing");
        assert_eq!(health.status, HealthStatus::SeverelyBleached);
    }
}
