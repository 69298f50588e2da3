use image::{DynamicImage, RgbImage};
use std::sync::Arc;
use std::time::Instant;

/// Shared context that flows through the frame analyzers. `working` is the
/// enhanced image when enhancement ran, otherwise the original.
#[derive(Clone)]
pub struct AnalysisContext {
    pub original: Arc<RgbImage>,
    pub working: Arc<RgbImage>,
    pub dimensions: (u32, u32),
    pub signals: Vec<Signal>,
    pub processing_start: Instant,
}

impl AnalysisContext {
    pub fn new(image: &DynamicImage) -> Self {
        let rgb = Arc::new(image.to_rgb8());
        let dimensions = rgb.dimensions();
        Self {
            original: rgb.clone(),
            working: rgb,
            dimensions,
            signals: Vec::new(),
            processing_start: Instant::now(),
        }
    }

    pub fn with_working(mut self, working: RgbImage) -> Self {
        self.working = Arc::new(working);
        self
    }

    pub fn add_signal(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    pub fn has_signal(&self, kind: SignalKind) -> bool {
        self.signals.iter().any(|s| s.kind == kind)
    }

    pub fn signal_value(&self, kind: SignalKind) -> Option<f32> {
        self.signals.iter().find(|s| s.kind == kind).and_then(|s| {
            match s.metadata {
                SignalMetadata::Fraction(value) => Some(value),
                _ => None,
            }
        })
    }
}

/// Result of one analyzer with confidence and reasoning.
#[derive(Debug, Clone)]
pub struct DetectionOutcome<T> {
    pub result: T,
    pub confidence: f32,
    pub reasoning: String,
    pub processing_time_us: u64,
    pub signals: Vec<Signal>,
}

impl<T> DetectionOutcome<T> {
    pub fn new(result: T, confidence: f32, reasoning: String) -> Self {
        Self {
            result,
            confidence,
            reasoning,
            processing_time_us: 0,
            signals: Vec::new(),
        }
    }

    pub fn with_signals(mut self, signals: Vec<Signal>) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_timing(mut self, start_time: Instant) -> Self {
        self.processing_time_us = start_time.elapsed().as_micros() as u64;
        self
    }
}

/// Individual evidence items the analyzers emit and combine.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub confidence: f32,
    pub region: Option<Region>,
    pub metadata: SignalMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    // Bleaching evidence
    WhiteMass,
    ColorDiversity,
    HealthyPalette,
    DominantColor,

    // Structure evidence
    EdgeDensity,
    CompactBody,
    BranchStructure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignalMetadata {
    None,
    Fraction(f32),
    Count(usize),
    Color(u8, u8, u8),
}

/// Rectangular region of an image for focused analysis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full_image(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Evidence detector over a frame (Chain of Responsibility)
pub trait FrameDetector: Send + Sync {
    fn detect(&self, context: &AnalysisContext) -> DetectionOutcome<Vec<Signal>>;
    fn priority(&self) -> u8; // Higher priority = processed first
    fn name(&self) -> &'static str;
    fn can_process(&self, context: &AnalysisContext) -> bool;
}
