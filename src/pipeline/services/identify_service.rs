use std::pin::Pin;
use std::sync::Arc;

use futures::task::{Context, Poll};
use futures::Future;
use tower::Service;

use crate::error::AppError;
use crate::pipeline::context::ReefObservation;
use crate::taxonomy::SpeciesResolver;

/// Pipeline stage that turns the measured growth form into a species match.
/// Runs after morphology; the resolver decides whether the catalog or the
/// store answers.
#[derive(Clone)]
pub struct IdentifyService {
    resolver: Arc<dyn SpeciesResolver>,
}

impl IdentifyService {
    pub fn new(resolver: Arc<dyn SpeciesResolver>) -> Self {
        Self { resolver }
    }
}

impl Service<ReefObservation> for IdentifyService {
    type Response = ReefObservation;
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), AppError>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, mut observation: ReefObservation) -> Self::Future {
        let resolver = self.resolver.clone();

        Box::pin(async move {
            let growth_form = observation.morphology()?.growth_form;
            observation.species = resolver.resolve(growth_form).await?;
            Ok(observation)
        })
    }
}
