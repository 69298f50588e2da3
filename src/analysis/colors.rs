use image::{Rgb, RgbImage};
use std::collections::HashMap;

/// A dominant color with its share of sampled pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DominantColor {
    pub color: Rgb<u8>,
    pub frequency: f32,
}

/// Extracts the top dominant colors by quantized histogram: sample on a
/// stride, bucket into 16 levels per channel, count, take the heaviest bins.
pub fn dominant_colors(image: &RgbImage, sample_step: u32, top: usize) -> Vec<DominantColor> {
    let step = sample_step.max(1) as usize;
    let mut color_counts: HashMap<(u8, u8, u8), u32> = HashMap::new();

    for y in (0..image.height()).step_by(step) {
        for x in (0..image.width()).step_by(step) {
            let px = image.get_pixel(x, y);
            let key = quantize_rgb(px, 16);
            *color_counts.entry(key).or_insert(0) += 1;
        }
    }

    let total: f32 = color_counts.values().map(|&c| c as f32).sum();
    if total == 0.0 {
        return Vec::new();
    }

    let mut sorted: Vec<_> = color_counts.into_iter().collect();
    sorted.sort_by_key(|&((r, g, b), c)| (std::cmp::Reverse(c), r, g, b));

    sorted
        .into_iter()
        .take(top)
        .map(|((r, g, b), c)| DominantColor {
            color: Rgb([r, g, b]),
            frequency: c as f32 / total,
        })
        .collect()
}

fn quantize_rgb(px: &Rgb<u8>, q: u8) -> (u8, u8, u8) {
    // q must divide 256 evenly (e.g., 16 or 32).
    let step = 256 / q as usize;
    let q1 = ((px[0] as usize / step) * step).min(255) as u8;
    let q2 = ((px[1] as usize / step) * step).min(255) as u8;
    let q3 = ((px[2] as usize / step) * step).min(255) as u8;
    (q1, q2, q3)
}

/// h, s, v all in [0, 1].
pub fn rgb_to_hsv(rgb: Rgb<u8>) -> (f32, f32, f32) {
    let r = rgb[0] as f32 / 255.0;
    let g = rgb[1] as f32 / 255.0;
    let b = rgb[2] as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max == 0.0 { 0.0 } else { delta / max };
    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        (((g - b) / delta).rem_euclid(6.0)) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    (h, s, v)
}

/// How a dominant color reads in reef terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteClass {
    /// Browns and greens at moderate saturation: live tissue with
    /// zooxanthellae.
    Healthy,
    /// Pale, washed-out color: exposed skeleton.
    Bleached,
    Other,
}

pub fn classify(color: Rgb<u8>) -> PaletteClass {
    let (h, s, v) = rgb_to_hsv(color);

    let brown_band = (0.05..=0.2).contains(&h);
    let green_band = (0.2..=0.4).contains(&h);
    if (brown_band || green_band) && (0.3..=0.8).contains(&s) && (0.3..=0.7).contains(&v) {
        PaletteClass::Healthy
    } else if s < 0.3 && v > 0.7 {
        PaletteClass::Bleached
    } else {
        PaletteClass::Other
    }
}

/// Mean saturation of the palette. Healthy colonies carry more color.
pub fn saturation_diversity(palette: &[DominantColor]) -> f32 {
    if palette.is_empty() {
        return 0.0;
    }
    let sum: f32 = palette
        .iter()
        .map(|entry| rgb_to_hsv(entry.color).1)
        .sum();
    sum / palette.len() as f32
}

/// Share of the palette that reads as live coral tissue.
pub fn healthy_fraction(palette: &[DominantColor]) -> f32 {
    if palette.is_empty() {
        return 0.0;
    }
    let healthy = palette
        .iter()
        .filter(|entry| classify(entry.color) == PaletteClass::Healthy)
        .count();
    healthy as f32 / palette.len() as f32
}

#[cfg(test)]
mod tests {
    use image::ImageBuffer;

    use super::*;

    #[test]
    fn solid_image_has_one_dominant_color() {
        let image = ImageBuffer::from_pixel(32, 32, Rgb([150u8, 100, 50]));
        let palette = dominant_colors(&image, 4, 5);
        assert_eq!(palette.len(), 1);
        assert!((palette[0].frequency - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn two_tone_image_splits_frequency() {
        let image = ImageBuffer::from_fn(32, 32, |x, _| {
            if x < 16 {
                Rgb([200u8, 40, 40])
            } else {
                Rgb([40u8, 40, 200])
            }
        });
        let palette = dominant_colors(&image, 1, 5);
        assert_eq!(palette.len(), 2);
        assert!((palette[0].frequency - 0.5).abs() < 0.01);
    }

    #[test]
    fn hsv_of_primaries() {
        let (h, s, v) = rgb_to_hsv(Rgb([255, 0, 0]));
        assert!(h.abs() < 0.01);
        assert!((s - 1.0).abs() < f32::EPSILON);
        assert!((v - 1.0).abs() < f32::EPSILON);

        let (h, _, _) = rgb_to_hsv(Rgb([0, 255, 0]));
        assert!((h - 1.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn brown_reads_healthy_and_white_reads_bleached() {
        // Mid-brown: hue in the brown band, moderate saturation and value.
        assert_eq!(classify(Rgb([140, 95, 60])), PaletteClass::Healthy);
        assert_eq!(classify(Rgb([240, 240, 235])), PaletteClass::Bleached);
        // Saturated pure blue is neither.
        assert_eq!(classify(Rgb([10, 10, 240])), PaletteClass::Other);
    }

    #[test]
    fn palette_metrics() {
        let palette = vec![
            DominantColor {
                color: Rgb([140, 95, 60]),
                frequency: 0.6,
            },
            DominantColor {
                color: Rgb([240, 240, 235]),
                frequency: 0.4,
            },
        ];
        assert!((healthy_fraction(&palette) - 0.5).abs() < f32::EPSILON);
        assert!(saturation_diversity(&palette) > 0.0);
    }
}
