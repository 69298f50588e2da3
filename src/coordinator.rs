use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;

use crate::config::Configuration;
use crate::db::{analyses, Store};
use crate::error::AppError;
use crate::pipeline::{AnalysisPipeline, ReefObservation};
use crate::report::{AnalysisReport, ReportWriter};
use crate::survey::{DuplicateFilter, ImageSource, SurveyFrame};

/// Owns the intake and processing tasks for one survey run.
pub struct Coordinator {
    intake_task: tokio::task::JoinHandle<()>,
    worker_task: tokio::task::JoinHandle<()>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    fn new(
        configuration: Configuration,
        pipeline: AnalysisPipeline,
        store: Option<Store>,
    ) -> Result<Self, AppError> {
        let cancel_token = CancellationToken::new();

        let (frame_tx, frame_rx) =
            tokio::sync::mpsc::channel(configuration.frame_buffer_size);

        let source = ImageSource::new(configuration.survey_dir.clone(), frame_tx);
        let intake_task = tokio::spawn(async move {
            if let Err(e) = source.run().await {
                tracing::error!("Intake failed: {}", e);
            }
        });

        let dedup = if configuration.dedup_frames {
            Some(DuplicateFilter::new(
                configuration.dedup_capacity,
                configuration.dedup_fp_rate,
            )?)
        } else {
            None
        };
        let store = configuration.persist_analyses.then_some(store).flatten();
        let writer = ReportWriter::new(configuration.output_dir.clone());

        let worker_task = Self::start_worker(
            pipeline,
            frame_rx,
            dedup,
            writer,
            store,
            cancel_token.clone(),
        );

        Ok(Self {
            intake_task,
            worker_task,
            cancel_token,
        })
    }

    fn start_worker(
        mut pipeline: AnalysisPipeline,
        mut frame_rx: Receiver<SurveyFrame>,
        mut dedup: Option<DuplicateFilter>,
        writer: ReportWriter,
        store: Option<Store>,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut received = 0usize;
            let mut analyzed = 0usize;
            let mut failed = 0usize;

            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    maybe_frame = frame_rx.recv() => {
                        let Some(frame) = maybe_frame else { break };
                        received += 1;

                        if let Some(filter) = dedup.as_mut() {
                            if filter.is_duplicate(&frame.image) {
                                tracing::debug!("Dropped duplicate frame {}", frame.file_name());
                                continue;
                            }
                        }

                        let name = frame.file_name();
                        match pipeline.process(frame).await {
                            Ok(observation) => {
                                analyzed += 1;
                                if let Err(e) = emit(&observation, &writer, store.as_ref()).await {
                                    failed += 1;
                                    tracing::error!("Failed to emit {}: {}", name, e);
                                }
                            }
                            Err(e) => {
                                failed += 1;
                                tracing::error!("Pipeline error on {}: {}", name, e);
                            }
                        }
                    }
                }
            }

            let duplicates = dedup
                .as_ref()
                .map(|filter| filter.duplicates_dropped())
                .unwrap_or(0);
            tracing::info!(
                "Survey run finished: {} frames, {} duplicates dropped, {} analyzed, {} failed",
                received,
                duplicates,
                analyzed,
                failed
            );
        })
    }

    /// Waits for the scan and the processing of every scanned frame.
    pub async fn join(&mut self) {
        if let Err(e) = (&mut self.intake_task).await {
            tracing::error!("Intake task failed: {}", e);
        }
        if let Err(e) = (&mut self.worker_task).await {
            tracing::error!("Worker task failed: {}", e);
        }
    }

    pub fn stop(&self) {
        self.cancel_token.cancel();
        self.intake_task.abort();
        self.worker_task.abort();
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Writes the JSON report and, when a store is attached, the analysis row.
async fn emit(
    observation: &ReefObservation,
    writer: &ReportWriter,
    store: Option<&Store>,
) -> Result<(), AppError> {
    let report = AnalysisReport::from_observation(observation)?;
    let path = writer.write(&report).await?;
    tracing::info!(
        "{}: {} ({:.1}%) -> {}",
        observation.frame.file_name(),
        report.health.status,
        report.health.bleaching_percentage,
        path.display()
    );

    if let Some(store) = store {
        let stored = observation.to_stored()?;
        let row = analyses::save(store.pool(), &stored).await?;
        tracing::debug!("Saved analysis row {}", row);
    }
    Ok(())
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    pipeline: Option<AnalysisPipeline>,
    store: Option<Store>,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            pipeline: None,
            store: None,
        }
    }

    pub fn pipeline(mut self, pipeline: AnalysisPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn store(mut self, store: Store) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        let pipeline = self
            .pipeline
            .ok_or(AppError::Pipeline("Pipeline not set".to_string()))?;
        Coordinator::new(self.configuration, pipeline, self.store)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::{ImageBuffer, Rgb};

    use crate::taxonomy::{CatalogResolver, SpeciesCatalog};

    use super::*;

    // Two-tone frames: the split orientation makes the perceptual hashes
    // distinct, a plain color change would not.
    fn write_split(dir: &std::path::Path, name: &str, vertical: bool, a: Rgb<u8>, b: Rgb<u8>) {
        ImageBuffer::from_fn(32, 32, |x, y| {
            let in_first = if vertical { x < 16 } else { y < 16 };
            if in_first {
                a
            } else {
                b
            }
        })
        .save(dir.join(name))
        .expect("Failed to save test image");
    }

    #[tokio::test]
    async fn survey_run_reports_and_persists() {
        let survey = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        // Two distinct frames and one duplicate of the first.
        write_split(survey.path(), "a.png", true, Rgb([90, 60, 30]), Rgb([150, 85, 40]));
        write_split(survey.path(), "b.png", true, Rgb([90, 60, 30]), Rgb([150, 85, 40]));
        write_split(survey.path(), "c.png", false, Rgb([235, 235, 230]), Rgb([60, 60, 60]));

        let configuration = Configuration {
            survey_dir: survey.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            ..Configuration::default()
        };

        let store = Store::in_memory().await.unwrap();
        let resolver = Arc::new(CatalogResolver::new(SpeciesCatalog::builtin()));
        let pipeline = AnalysisPipeline::standard(&configuration, resolver);

        let mut coordinator = CoordinatorBuilder::new(configuration)
            .pipeline(pipeline)
            .store(store.clone())
            .build()
            .expect("Failed to build coordinator");
        coordinator.join().await;

        let reports: Vec<_> = std::fs::read_dir(output.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .collect();
        assert_eq!(reports.len(), 2);
        assert_eq!(analyses::count(store.pool()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn quick_scan_skips_persistence() {
        let survey = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_split(survey.path(), "a.png", true, Rgb([90, 60, 30]), Rgb([150, 85, 40]));

        let configuration = Configuration {
            survey_dir: survey.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            ..Configuration::quick_scan()
        };

        let store = Store::in_memory().await.unwrap();
        let resolver = Arc::new(CatalogResolver::new(SpeciesCatalog::builtin()));
        let pipeline = AnalysisPipeline::standard(&configuration, resolver);

        let mut coordinator = CoordinatorBuilder::new(configuration)
            .pipeline(pipeline)
            .store(store.clone())
            .build()
            .unwrap();
        coordinator.join().await;

        assert_eq!(analyses::count(store.pool()).await.unwrap(), 0);
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn stop_cancels_a_run() {
        let survey = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let configuration = Configuration {
            survey_dir: survey.path().to_path_buf(),
            output_dir: output.path().to_path_buf(),
            ..Configuration::default()
        };
        let resolver = Arc::new(CatalogResolver::new(SpeciesCatalog::builtin()));
        let pipeline = AnalysisPipeline::standard(&configuration, resolver);

        let coordinator = CoordinatorBuilder::new(configuration)
            .pipeline(pipeline)
            .build()
            .unwrap();
        coordinator.stop();
    }
}
