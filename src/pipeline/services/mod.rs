pub mod enhance_service;
pub mod health_service;
pub mod identify_service;
pub mod insight_service;
pub mod morphology_service;

pub use enhance_service::EnhanceService;
pub use health_service::HealthService;
pub use identify_service::IdentifyService;
pub use insight_service::InsightService;
pub use morphology_service::MorphologyService;
