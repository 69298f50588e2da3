//! Growth-form classification from colony shape. The colony body is split
//! from the water background, the largest connected body is measured, and
//! compactness decides the form.

use std::time::Instant;

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::analysis::core::{
    AnalysisContext, DetectionOutcome, Region, Signal, SignalKind, SignalMetadata,
};
use crate::taxonomy::GrowthForm;

const EDGE_MAGNITUDE_THRESHOLD: f32 = 150.0;

/// Shape features of the largest colony body in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MorphologyReport {
    pub growth_form: GrowthForm,
    /// 4*pi*area / perimeter^2, 1.0 for a perfect disc.
    pub circularity: f32,
    pub aspect_ratio: f32,
    pub area: u32,
    pub perimeter: u32,
    pub component_count: usize,
    /// Strong-edge pixels per bounding-box pixel.
    pub edge_density: f32,
}

impl MorphologyReport {
    fn unknown() -> Self {
        Self {
            growth_form: GrowthForm::Unknown,
            circularity: 0.0,
            aspect_ratio: 0.0,
            area: 0,
            perimeter: 0,
            component_count: 0,
            edge_density: 0.0,
        }
    }
}

pub struct MorphologyAnalyzer;

impl MorphologyAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, context: &AnalysisContext) -> DetectionOutcome<MorphologyReport> {
        let start_time = Instant::now();
        let luma = image::DynamicImage::ImageRgb8((*context.working).clone()).to_luma8();

        let Some(mask) = body_mask(&luma) else {
            return DetectionOutcome::new(
                MorphologyReport::unknown(),
                0.2,
                "No colony body found".to_string(),
            )
            .with_timing(start_time);
        };

        let components = connected_components(&mask.pixels, luma.width(), luma.height());
        let Some(largest) = components.iter().max_by_key(|c| c.area) else {
            return DetectionOutcome::new(
                MorphologyReport::unknown(),
                0.2,
                "No colony body found".to_string(),
            )
            .with_timing(start_time);
        };

        let circularity = if largest.perimeter > 0 {
            4.0 * std::f32::consts::PI * largest.area as f32
                / (largest.perimeter as f32 * largest.perimeter as f32)
        } else {
            0.0
        };
        let aspect_ratio = largest.bounds.aspect_ratio();
        let edge_density = edge_density(&luma, &largest.bounds);

        let growth_form = classify(circularity, aspect_ratio);

        // Confidence tracks how far compactness sits from the cutoffs.
        let confidence = match growth_form {
            GrowthForm::Branching => (0.3 - circularity) / 0.3 * 0.4 + 0.55,
            GrowthForm::Encrusting => ((circularity - 0.6) / 0.4).min(1.0) * 0.3 + 0.6,
            _ => 0.7,
        };

        let report = MorphologyReport {
            growth_form,
            circularity,
            aspect_ratio,
            area: largest.area,
            perimeter: largest.perimeter,
            component_count: components.len(),
            edge_density,
        };

        let mut signals = vec![Signal {
            kind: SignalKind::EdgeDensity,
            confidence: 0.6,
            region: Some(largest.bounds),
            metadata: SignalMetadata::Fraction(edge_density),
        }];
        signals.push(Signal {
            kind: if growth_form == GrowthForm::Branching {
                SignalKind::BranchStructure
            } else {
                SignalKind::CompactBody
            },
            confidence: confidence.clamp(0.0, 1.0),
            region: Some(largest.bounds),
            metadata: SignalMetadata::Fraction(circularity),
        });

        DetectionOutcome::new(
            report,
            confidence.clamp(0.0, 1.0),
            format!(
                "{} bodies, largest area={} circularity={:.2} aspect={:.2} -> {}",
                components.len(),
                largest.area,
                circularity,
                aspect_ratio,
                growth_form
            ),
        )
        .with_signals(signals)
        .with_timing(start_time)
    }
}

impl Default for MorphologyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(circularity: f32, aspect_ratio: f32) -> GrowthForm {
    if circularity < 0.3 {
        GrowthForm::Branching
    } else if circularity < 0.6 {
        if aspect_ratio > 1.5 || aspect_ratio < 0.67 {
            GrowthForm::PlateTable
        } else {
            GrowthForm::Boulder
        }
    } else {
        GrowthForm::Encrusting
    }
}

struct BodyMask {
    /// true = colony pixel
    pixels: Vec<bool>,
}

/// Splits colony from water by Otsu's threshold, then picks the class that
/// occupies less of the frame border: open water surrounds the colony.
fn body_mask(luma: &GrayImage) -> Option<BodyMask> {
    let (width, height) = luma.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let threshold = otsu_threshold(luma)?;

    let dark: Vec<bool> = luma.pixels().map(|p| p.0[0] <= threshold).collect();

    let mut dark_border = 0u32;
    let mut border = 0u32;
    for y in 0..height {
        for x in 0..width {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                border += 1;
                if dark[(y * width + x) as usize] {
                    dark_border += 1;
                }
            }
        }
    }

    let dark_is_background = dark_border * 2 > border;
    let pixels = if dark_is_background {
        dark.iter().map(|&d| !d).collect()
    } else {
        dark
    };

    Some(BodyMask { pixels })
}

/// Otsu's method over the luma histogram. Returns None when the image has no
/// contrast to split.
fn otsu_threshold(luma: &GrayImage) -> Option<u8> {
    let mut histogram = [0u32; 256];
    for p in luma.pixels() {
        histogram[p.0[0] as usize] += 1;
    }

    let total = (luma.width() * luma.height()) as f64;
    let min = histogram.iter().position(|&c| c > 0)?;
    let max = histogram.iter().rposition(|&c| c > 0)?;
    if min == max {
        return None;
    }

    let weighted_sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(v, &c)| v as f64 * c as f64)
        .sum();

    let mut best_threshold = min as u8;
    let mut best_variance = -1.0f64;
    let mut background_count = 0.0f64;
    let mut background_sum = 0.0f64;

    for v in min..max {
        background_count += histogram[v] as f64;
        background_sum += v as f64 * histogram[v] as f64;
        let foreground_count = total - background_count;
        if background_count == 0.0 || foreground_count == 0.0 {
            continue;
        }

        let background_mean = background_sum / background_count;
        let foreground_mean = (weighted_sum - background_sum) / foreground_count;
        let diff = background_mean - foreground_mean;
        let variance = background_count * foreground_count * diff * diff;
        if variance > best_variance {
            best_variance = variance;
            best_threshold = v as u8;
        }
    }

    Some(best_threshold)
}

struct Component {
    area: u32,
    perimeter: u32,
    bounds: Region,
}

/// 4-connected component labeling by iterative flood fill.
fn connected_components(mask: &[bool], width: u32, height: u32) -> Vec<Component> {
    let mut visited = vec![false; mask.len()];
    let mut components = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }

        let mut area = 0u32;
        let mut perimeter = 0u32;
        let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
        let (mut max_x, mut max_y) = (0u32, 0u32);

        let mut stack = vec![start];
        visited[start] = true;
        while let Some(index) = stack.pop() {
            let x = index as u32 % width;
            let y = index as u32 / width;
            area += 1;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);

            let mut on_boundary = false;
            let neighbors = [
                (x > 0).then(|| index - 1),
                (x + 1 < width).then(|| index + 1),
                (y > 0).then(|| index - width as usize),
                (y + 1 < height).then(|| index + width as usize),
            ];
            for neighbor in neighbors.into_iter().flatten() {
                if mask[neighbor] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        stack.push(neighbor);
                    }
                } else {
                    on_boundary = true;
                }
            }
            // Image border also bounds the body.
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                on_boundary = true;
            }
            if on_boundary {
                perimeter += 1;
            }
        }

        components.push(Component {
            area,
            perimeter,
            bounds: Region::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
        });
    }

    components
}

/// Sobel gradient magnitude, thresholded, within a region.
fn edge_density(luma: &GrayImage, bounds: &Region) -> f32 {
    if bounds.area() == 0 {
        return 0.0;
    }
    let (width, height) = luma.dimensions();
    let at = |x: i64, y: i64| -> f32 {
        let sx = x.clamp(0, width as i64 - 1) as u32;
        let sy = y.clamp(0, height as i64 - 1) as u32;
        luma.get_pixel(sx, sy).0[0] as f32
    };

    let mut edges = 0u32;
    for y in bounds.y..(bounds.y + bounds.height).min(height) {
        for x in bounds.x..(bounds.x + bounds.width).min(width) {
            let (x, y) = (x as i64, y as i64);
            let gx = -at(x - 1, y - 1) - 2.0 * at(x - 1, y) - at(x - 1, y + 1)
                + at(x + 1, y - 1)
                + 2.0 * at(x + 1, y)
                + at(x + 1, y + 1);
            let gy = -at(x - 1, y - 1) - 2.0 * at(x, y - 1) - at(x + 1, y - 1)
                + at(x - 1, y + 1)
                + 2.0 * at(x, y + 1)
                + at(x + 1, y + 1);
            if (gx * gx + gy * gy).sqrt() >= EDGE_MAGNITUDE_THRESHOLD {
                edges += 1;
            }
        }
    }

    edges as f32 / bounds.area() as f32
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, ImageBuffer, Rgb};

    use super::*;

    const WATER: Rgb<u8> = Rgb([180, 200, 220]);
    const CORAL: Rgb<u8> = Rgb([90, 60, 30]);

    fn frame_with<F: Fn(u32, u32) -> bool>(coral_at: F) -> AnalysisContext {
        let image = ImageBuffer::from_fn(64, 64, |x, y| {
            if coral_at(x, y) {
                CORAL
            } else {
                WATER
            }
        });
        AnalysisContext::new(&DynamicImage::ImageRgb8(image))
    }

    #[test]
    fn disc_is_encrusting() {
        let context = frame_with(|x, y| {
            let dx = x as i32 - 32;
            let dy = y as i32 - 32;
            dx * dx + dy * dy <= 20 * 20
        });
        let report = MorphologyAnalyzer::new().analyze(&context).result;
        assert_eq!(report.growth_form, GrowthForm::Encrusting);
        assert!(report.circularity >= 0.6, "{}", report.circularity);
    }

    #[test]
    fn wide_slab_is_plate_table() {
        let context = frame_with(|x, y| (2..62).contains(&x) && (26..38).contains(&y));
        let report = MorphologyAnalyzer::new().analyze(&context).result;
        assert_eq!(report.growth_form, GrowthForm::PlateTable);
        assert!(report.aspect_ratio > 1.5);
    }

    #[test]
    fn cross_shape_is_boulder() {
        let context =
            frame_with(|x, y| ((8..56).contains(&x) && (26..38).contains(&y))
                || ((26..38).contains(&x) && (8..56).contains(&y)));
        let report = MorphologyAnalyzer::new().analyze(&context).result;
        assert_eq!(report.growth_form, GrowthForm::Boulder);
    }

    #[test]
    fn thin_strand_is_branching() {
        let context = frame_with(|x, y| (2..62).contains(&x) && (31..33).contains(&y));
        let report = MorphologyAnalyzer::new().analyze(&context).result;
        assert_eq!(report.growth_form, GrowthForm::Branching);
        assert!(report.circularity < 0.3);
    }

    #[test]
    fn uniform_frame_is_unknown() {
        let context = frame_with(|_, _| true);
        let report = MorphologyAnalyzer::new().analyze(&context).result;
        assert_eq!(report.growth_form, GrowthForm::Unknown);
        assert_eq!(report.area, 0);
    }

    #[test]
    fn components_are_counted() {
        // Two separate bodies; the larger drives the classification.
        let context = frame_with(|x, y| {
            let in_big = (10..40).contains(&x) && (10..40).contains(&y);
            let in_small = (50..56).contains(&x) && (50..56).contains(&y);
            in_big || in_small
        });
        let report = MorphologyAnalyzer::new().analyze(&context).result;
        assert_eq!(report.component_count, 2);
        assert_eq!(report.area, 900);
    }
}
