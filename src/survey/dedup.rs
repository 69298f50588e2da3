use bloomfilter::Bloom;
use image::{imageops::FilterType, DynamicImage};

use crate::error::AppError;

const HASH_SIDE: u32 = 8;

/// Drops survey frames that were already seen this run. Dive footage dwells
/// on the same colony for seconds at a time; hashing each frame down to an
/// 8x8 average hash and remembering the hashes in a bloom filter keeps the
/// pipeline from re-analyzing near-identical frames.
pub struct DuplicateFilter {
    seen: Bloom<String>,
    duplicates: usize,
}

impl DuplicateFilter {
    pub fn new(capacity: usize, fp_rate: f64) -> Result<Self, AppError> {
        let seen = Bloom::new_for_fp_rate(capacity, fp_rate)
            .map_err(|e| AppError::Config(format!("Invalid dedup parameters: {e}")))?;
        Ok(Self {
            seen,
            duplicates: 0,
        })
    }

    /// Returns true when the frame is a duplicate of one already observed.
    pub fn is_duplicate(&mut self, image: &DynamicImage) -> bool {
        let hash = average_hash(image);
        let duplicate = self.seen.check_and_set(&hash);
        if duplicate {
            self.duplicates += 1;
        }
        duplicate
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates
    }
}

/// 8x8 average hash over luma, encoded as hex. Robust to compression noise,
/// sensitive to actual scene changes.
fn average_hash(image: &DynamicImage) -> String {
    let thumb = image
        .resize_exact(HASH_SIDE, HASH_SIDE, FilterType::Triangle)
        .to_luma8();

    let sum: u32 = thumb.pixels().map(|p| p.0[0] as u32).sum();
    let mean = sum / (HASH_SIDE * HASH_SIDE);

    let mut bits: u64 = 0;
    for (i, pixel) in thumb.pixels().enumerate() {
        if pixel.0[0] as u32 >= mean {
            bits |= 1 << i;
        }
    }
    format!("{bits:016x}")
}

#[cfg(test)]
mod tests {
    use image::{ImageBuffer, Rgb};

    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(32, 32, Rgb([r, g, b])))
    }

    fn gradient() -> DynamicImage {
        let image = ImageBuffer::from_fn(32, 32, |x, y| {
            if x + y < 24 {
                Rgb([20u8, 20, 20])
            } else {
                Rgb([230u8, 230, 230])
            }
        });
        DynamicImage::ImageRgb8(image)
    }

    #[test]
    fn repeated_frame_is_flagged() {
        let mut filter = DuplicateFilter::new(100, 0.01).unwrap();
        let frame = gradient();
        assert!(!filter.is_duplicate(&frame));
        assert!(filter.is_duplicate(&frame));
        assert_eq!(filter.duplicates_dropped(), 1);
    }

    #[test]
    fn distinct_frames_pass() {
        let mut filter = DuplicateFilter::new(100, 0.01).unwrap();
        assert!(!filter.is_duplicate(&gradient()));
        assert!(!filter.is_duplicate(&solid(200, 40, 40)));
    }

    #[test]
    fn bad_fp_rate_is_rejected() {
        assert!(DuplicateFilter::new(100, 0.0).is_err());
    }
}
