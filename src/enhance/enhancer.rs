use image::{DynamicImage, Rgb, RgbImage};

use crate::enhance::clahe::Clahe;
use crate::enhance::color::{decode_ab, decode_l, encode_ab, encode_l, lab_to_srgb, srgb_to_lab};

/// Underwater image enhancement: equalize lightness, cut the blue-green
/// water cast, then sharpen.
#[derive(Debug, Clone)]
pub struct Enhancer {
    clahe: Clahe,
    /// Fraction of the b* channel pulled toward neutral. 0.3 means
    /// `b' = 0.7*b + 0.3*neutral`.
    cast_pull: f32,
}

impl Enhancer {
    pub fn new() -> Self {
        Self {
            clahe: Clahe::new(2.0, 8, 8),
            cast_pull: 0.3,
        }
    }

    pub fn with_cast_pull(mut self, cast_pull: f32) -> Self {
        self.cast_pull = cast_pull.clamp(0.0, 1.0);
        self
    }

    pub fn enhance(&self, image: &DynamicImage) -> RgbImage {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return rgb;
        }

        let mut lab: Vec<[f32; 3]> = rgb.pixels().map(|p| srgb_to_lab(p.0)).collect();

        // Lightness equalization runs on the 8-bit L plane.
        let mut l_plane: Vec<u8> = lab.iter().map(|px| encode_l(px[0])).collect();
        self.clahe.apply(&mut l_plane, width, height);

        let neutral = 128.0;
        for (px, l) in lab.iter_mut().zip(&l_plane) {
            px[0] = decode_l(*l);
            let b_enc = encode_ab(px[2]);
            px[2] = decode_ab(b_enc * (1.0 - self.cast_pull) + neutral * self.cast_pull);
        }

        let corrected = RgbImage::from_fn(width, height, |x, y| {
            Rgb(lab_to_srgb(lab[(y * width + x) as usize]))
        });

        sharpen(&corrected)
    }
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new()
    }
}

// 3x3 sharpen: center 5, cross -1. Samples are clamped at the borders.
fn sharpen(image: &RgbImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let mut out = [0u8; 3];
        for c in 0..3 {
            let at = |dx: i32, dy: i32| -> f32 {
                let sx = (x as i32 + dx).clamp(0, width as i32 - 1) as u32;
                let sy = (y as i32 + dy).clamp(0, height as i32 - 1) as u32;
                image.get_pixel(sx, sy).0[c] as f32
            };
            let value =
                5.0 * at(0, 0) - at(-1, 0) - at(1, 0) - at(0, -1) - at(0, 1);
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}
