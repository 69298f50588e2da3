pub mod analysis;
pub mod config;
pub mod coordinator;
pub mod db;
pub mod enhance;
pub mod error;
pub mod insight;
pub mod pipeline;
pub mod report;
pub mod survey;
pub mod taxonomy;

pub use config::Configuration;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::AppError;
pub use pipeline::AnalysisPipeline;
