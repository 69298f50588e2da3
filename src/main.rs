use std::sync::Arc;

use reefscan::config::Configuration;
use reefscan::coordinator::CoordinatorBuilder;
use reefscan::db::{Store, StoreResolver};
use reefscan::error::AppError;
use reefscan::pipeline::AnalysisPipeline;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let configuration = Configuration::load()?;

    let store = Store::connect(&configuration.database_url).await?;
    let resolver = Arc::new(StoreResolver::new(store.pool().clone()));
    let pipeline = AnalysisPipeline::standard(&configuration, resolver);

    let mut coordinator = CoordinatorBuilder::new(configuration)
        .pipeline(pipeline)
        .store(store)
        .build()?;
    coordinator.join().await;
    Ok(())
}
