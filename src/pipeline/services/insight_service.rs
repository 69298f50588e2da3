use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower::Service;

use crate::error::AppError;
use crate::insight;
use crate::pipeline::context::ReefObservation;

/// Final stage: turns the graded assessment into conservation guidance.
#[derive(Clone)]
pub struct InsightService;

impl InsightService {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InsightService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<ReefObservation> for InsightService {
    type Response = ReefObservation;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut observation: ReefObservation) -> Self::Future {
        Box::pin(async move {
            let report = {
                let health = observation.health()?;
                let morphology = observation.morphology()?;
                insight::generate(health, morphology, observation.species.as_ref())
            };
            observation.insights = Some(report);
            Ok(observation)
        })
    }
}
