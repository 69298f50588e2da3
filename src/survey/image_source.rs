use std::path::{Path, PathBuf};

use tokio::sync::mpsc::Sender;
use tokio_stream::{wrappers::ReadDirStream, StreamExt};

use crate::error::IntakeError;
use crate::survey::frame::SurveyFrame;

const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Reads survey imagery from a directory and feeds decoded frames into the
/// pipeline channel. Undecodable files are logged and skipped; a closed
/// channel ends the scan.
pub struct ImageSource {
    survey_dir: PathBuf,
    frame_tx: Sender<SurveyFrame>,
}

impl ImageSource {
    pub fn new(survey_dir: PathBuf, frame_tx: Sender<SurveyFrame>) -> Self {
        Self {
            survey_dir,
            frame_tx,
        }
    }

    /// Scans the survey directory once and returns the number of frames sent.
    pub async fn run(self) -> Result<usize, IntakeError> {
        let read_dir = tokio::fs::read_dir(&self.survey_dir)
            .await
            .map_err(|e| IntakeError::ScanError(e, self.survey_dir.clone()))?;

        let mut paths: Vec<PathBuf> = ReadDirStream::new(read_dir)
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| Self::is_supported(path))
            .collect()
            .await;
        // Survey footage is named by capture order; sort so analyses are too.
        paths.sort();

        let mut sent = 0;
        for path in paths {
            let frame = match Self::load_frame(&path).await {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let id = frame.id;
            if self.frame_tx.send(frame).await.is_err() {
                return Err(IntakeError::ChannelClosed(id));
            }
            sent += 1;
        }

        tracing::info!(
            "Survey scan of {} complete, {} frames sent",
            self.survey_dir.display(),
            sent
        );
        Ok(sent)
    }

    async fn load_frame(path: &Path) -> Result<SurveyFrame, IntakeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IntakeError::ReadError(e, path.to_path_buf()))?;
        let image = image::load_from_memory(&bytes)
            .map_err(|e| IntakeError::DecodeError(e, path.to_path_buf()))?;
        Ok(SurveyFrame::new(image, path.to_path_buf()))
    }

    fn is_supported(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                SUPPORTED_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb};

    use super::*;

    fn write_test_image(dir: &Path, name: &str) {
        let image = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(16, 16, Rgb([120, 90, 60]));
        image.save(dir.join(name)).expect("Failed to save test image");
    }

    #[tokio::test]
    async fn scans_supported_files_in_name_order() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_test_image(dir.path(), "b.png");
        write_test_image(dir.path(), "a.png");
        std::fs::write(dir.path().join("notes.txt"), "dive log").unwrap();

        let (frame_tx, mut frame_rx) = tokio::sync::mpsc::channel(10);
        let sent = ImageSource::new(dir.path().to_path_buf(), frame_tx)
            .run()
            .await
            .expect("Scan failed");
        assert_eq!(sent, 2);

        let first = frame_rx.recv().await.unwrap();
        let second = frame_rx.recv().await.unwrap();
        assert_eq!(first.file_name(), "a.png");
        assert_eq!(second.file_name(), "b.png");
    }

    #[tokio::test]
    async fn undecodable_file_is_skipped() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join("broken.jpg"), b"not an image").unwrap();
        write_test_image(dir.path(), "good.png");

        let (frame_tx, mut frame_rx) = tokio::sync::mpsc::channel(10);
        let sent = ImageSource::new(dir.path().to_path_buf(), frame_tx)
            .run()
            .await
            .expect("Scan failed");
        assert_eq!(sent, 1);
        assert_eq!(frame_rx.recv().await.unwrap().file_name(), "good.png");
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let (frame_tx, _frame_rx) = tokio::sync::mpsc::channel(1);
        let result = ImageSource::new(PathBuf::from("/nonexistent/survey"), frame_tx)
            .run()
            .await;
        assert!(matches!(result, Err(IntakeError::ScanError(_, _))));
    }
}
