pub mod bleaching;
pub mod colors;
pub mod core;
pub mod health;
pub mod morphology;

pub use bleaching::BleachingDetector;
pub use core::{AnalysisContext, DetectionOutcome, FrameDetector, Region, Signal, SignalKind};
pub use health::{HealthAssessment, HealthStatus};
pub use morphology::{MorphologyAnalyzer, MorphologyReport};
