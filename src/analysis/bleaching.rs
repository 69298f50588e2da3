//! Bleaching detection: pale-mass measurement plus palette evidence,
//! combined into a graded health assessment.

use std::time::Instant;

use crate::analysis::colors::{
    dominant_colors, healthy_fraction, rgb_to_hsv, saturation_diversity,
};
use crate::analysis::core::{
    AnalysisContext, DetectionOutcome, FrameDetector, Region, Signal, SignalKind, SignalMetadata,
};
use crate::analysis::health::{self, HealthAssessment};

// Pale skeleton pixels: barely saturated, bright.
const WHITE_SATURATION_MAX: f32 = 30.0 / 255.0;
const WHITE_VALUE_MIN: f32 = 180.0 / 255.0;

/// Measures the fraction of the frame covered by pale, washed-out pixels.
pub struct WhiteMassDetector {
    pub sample_step: u32,
}

impl WhiteMassDetector {
    pub fn new(sample_step: u32) -> Self {
        Self {
            sample_step: sample_step.max(1),
        }
    }
}

impl FrameDetector for WhiteMassDetector {
    fn detect(&self, context: &AnalysisContext) -> DetectionOutcome<Vec<Signal>> {
        let start_time = Instant::now();
        let (width, height) = context.dimensions;

        let mut white = 0u32;
        let mut total = 0u32;
        for y in (0..height).step_by(self.sample_step as usize) {
            for x in (0..width).step_by(self.sample_step as usize) {
                let (_, s, v) = rgb_to_hsv(*context.working.get_pixel(x, y));
                if s <= WHITE_SATURATION_MAX && v >= WHITE_VALUE_MIN {
                    white += 1;
                }
                total += 1;
            }
        }

        let fraction = if total == 0 {
            0.0
        } else {
            white as f32 / total as f32
        };

        let signals = vec![Signal {
            kind: SignalKind::WhiteMass,
            confidence: 0.9,
            region: Some(Region::full_image(width, height)),
            metadata: SignalMetadata::Fraction(fraction),
        }];

        DetectionOutcome::new(
            signals.clone(),
            0.9,
            format!("White mass covers {:.1}% of frame", fraction * 100.0),
        )
        .with_signals(signals)
        .with_timing(start_time)
    }

    fn priority(&self) -> u8 {
        100 // The single strongest bleaching indicator.
    }

    fn name(&self) -> &'static str {
        "WhiteMassDetector"
    }

    fn can_process(&self, context: &AnalysisContext) -> bool {
        let (width, height) = context.dimensions;
        width > 0 && height > 0
    }
}

/// Reads the dominant palette for tissue-color evidence.
pub struct PaletteDetector {
    pub sample_step: u32,
    pub palette_size: usize,
}

impl PaletteDetector {
    pub fn new(sample_step: u32) -> Self {
        Self {
            sample_step: sample_step.max(1),
            palette_size: 5,
        }
    }
}

impl FrameDetector for PaletteDetector {
    fn detect(&self, context: &AnalysisContext) -> DetectionOutcome<Vec<Signal>> {
        let start_time = Instant::now();
        let palette = dominant_colors(&context.working, self.sample_step, self.palette_size);

        let diversity = saturation_diversity(&palette);
        let healthy = healthy_fraction(&palette);

        let mut signals = vec![
            Signal {
                kind: SignalKind::ColorDiversity,
                confidence: 0.7,
                region: None,
                metadata: SignalMetadata::Fraction(diversity),
            },
            Signal {
                kind: SignalKind::HealthyPalette,
                confidence: 0.7,
                region: None,
                metadata: SignalMetadata::Fraction(healthy),
            },
        ];
        for entry in &palette {
            signals.push(Signal {
                kind: SignalKind::DominantColor,
                confidence: entry.frequency,
                region: None,
                metadata: SignalMetadata::Color(
                    entry.color[0],
                    entry.color[1],
                    entry.color[2],
                ),
            });
        }

        DetectionOutcome::new(
            signals.clone(),
            0.7,
            format!(
                "Palette of {} colors, diversity {:.2}, healthy share {:.2}",
                palette.len(),
                diversity,
                healthy
            ),
        )
        .with_signals(signals)
        .with_timing(start_time)
    }

    fn priority(&self) -> u8 {
        50
    }

    fn name(&self) -> &'static str {
        "PaletteDetector"
    }

    fn can_process(&self, context: &AnalysisContext) -> bool {
        let (width, height) = context.dimensions;
        width > 0 && height > 0
    }
}

/// Runs the evidence detectors and grades the combined bleaching score.
///
/// Score = 0.6 * white mass + 0.2 * (1 - diversity) + 0.2 * (1 - healthy).
pub struct BleachingDetector {
    detectors: Vec<Box<dyn FrameDetector>>,
}

impl BleachingDetector {
    pub fn new(sample_step: u32) -> Self {
        let mut detectors: Vec<Box<dyn FrameDetector>> = vec![
            Box::new(WhiteMassDetector::new(sample_step)),
            Box::new(PaletteDetector::new(sample_step)),
        ];
        detectors.sort_by_key(|d| std::cmp::Reverse(d.priority()));
        Self { detectors }
    }

    pub fn assess(&self, context: &mut AnalysisContext) -> DetectionOutcome<HealthAssessment> {
        let start_time = Instant::now();

        for detector in &self.detectors {
            if !detector.can_process(context) {
                tracing::debug!("{} skipped frame", detector.name());
                continue;
            }
            let outcome = detector.detect(context);
            tracing::debug!("{}: {}", detector.name(), outcome.reasoning);
            for signal in outcome.signals {
                context.add_signal(signal);
            }
        }

        let white = context.signal_value(SignalKind::WhiteMass).unwrap_or(0.0);
        let diversity = context
            .signal_value(SignalKind::ColorDiversity)
            .unwrap_or(0.0);
        let healthy = context
            .signal_value(SignalKind::HealthyPalette)
            .unwrap_or(0.0);

        let score = white * 0.6 + (1.0 - diversity) * 0.2 + (1.0 - healthy) * 0.2;
        let assessment = health::grade(score * 100.0);

        DetectionOutcome::new(
            assessment,
            assessment.confidence / 100.0,
            format!(
                "white={:.2} diversity={:.2} healthy={:.2} -> {:.1}% ({})",
                white,
                diversity,
                healthy,
                assessment.bleaching_percentage,
                assessment.status
            ),
        )
        .with_timing(start_time)
    }
}
