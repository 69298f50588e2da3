use std::path::PathBuf;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use uuid::Uuid;

/// A single decoded survey image, as it enters the pipeline.
#[derive(Debug, Clone)]
pub struct SurveyFrame {
    pub id: Uuid,
    pub image: DynamicImage,
    pub source: PathBuf,
    pub captured_at: DateTime<Utc>,
}

impl SurveyFrame {
    pub fn new(image: DynamicImage, source: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            source,
            captured_at: Utc::now(),
        }
    }

    /// File name of the originating image, for logs and stored analyses.
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.to_string_lossy().into_owned())
    }
}
