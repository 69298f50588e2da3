use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;

use crate::enhance::Enhancer;
use crate::error::AppError;
use crate::pipeline::context::ReefObservation;

/// Pipeline stage that attaches the enhanced working image.
#[derive(Clone)]
pub struct EnhanceService {
    enhancer: Enhancer,
}

impl EnhanceService {
    pub fn new(enhancer: Enhancer) -> Self {
        Self { enhancer }
    }
}

impl Service<ReefObservation> for EnhanceService {
    type Response = ReefObservation;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut observation: ReefObservation) -> Self::Future {
        let enhanced = self.enhancer.enhance(&observation.frame.image);
        observation.enhanced = Some(enhanced);

        Box::pin(async move { Ok(observation) })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use image::{DynamicImage, ImageBuffer, Rgb};
    use tower::ServiceExt;

    use crate::survey::SurveyFrame;

    use super::*;

    #[tokio::test]
    async fn attaches_an_enhanced_image() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(16, 16, Rgb([40, 80, 170])));
        let observation =
            ReefObservation::new(SurveyFrame::new(image, PathBuf::from("frame.png")));

        let service = EnhanceService::new(Enhancer::new());
        let result = service.oneshot(observation).await.unwrap();
        let enhanced = result.enhanced.expect("enhanced image missing");
        assert_eq!(enhanced.dimensions(), (16, 16));
    }
}
