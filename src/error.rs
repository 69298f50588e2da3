use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Intake Error: {0}")]
    Intake(#[from] IntakeError),
    #[error("Analysis Error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Store Error: {0}")]
    Store(#[from] StoreError),
    #[error("Report Error: {0}")]
    Report(#[from] ReportError),
    #[error("Configuration Error: {0}")]
    Config(String),
    #[error("Pipeline Error: {0}")]
    Pipeline(String),
}

// Survey intake errors
#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to read survey directory {1}: {0}")]
    ScanError(std::io::Error, PathBuf),
    #[error("Failed to read image file {1}: {0}")]
    ReadError(std::io::Error, PathBuf),
    #[error("Failed to decode image {1}: {0}")]
    DecodeError(image::ImageError, PathBuf),
    #[error("Frame channel closed while sending frame {0}")]
    ChannelClosed(Uuid),
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Image is empty ({0}x{1})")]
    EmptyImage(u32, u32),
    #[error("Observation is missing the {0} stage output")]
    MissingStage(&'static str),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to serialize insights: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write report {1}: {0}")]
    WriteError(std::io::Error, PathBuf),
    #[error("Failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}
