//! kirinuki-mask: Pure mask compositing routines (sans-IO).
//!
//! Turns the raw output of a point-prompt segmentation decode — a set
//! of scored binary mask candidates — into a smooth transparent
//! cutout:
//!
//! 1. [`select::best_candidate`] picks the highest-scoring mask.
//! 2. [`feather::feather_mask`] softens the hard binary boundary into
//!    a gradated alpha ramp.
//! 3. [`composite::composite_cutout`] combines the source image with
//!    the feathered alpha plane.
//!
//! This crate has **no I/O dependencies** — it operates on in-memory
//! pixel buffers and returns structured data. Session orchestration
//! lives in `kirinuki-session`.

pub mod composite;
pub mod feather;
pub mod select;
pub mod types;

pub use composite::composite_cutout;
pub use feather::{DEFAULT_RADIUS, feather_mask};
pub use select::best_candidate;
pub use types::{GrayImage, MaskError, MaskResult, RgbaImage};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// End-to-end: scored candidates -> selected plane -> feathered
    /// alpha -> transparent cutout.
    #[test]
    fn full_cutout_flow() {
        let (w, h) = (8u32, 8u32);
        let plane_len = (w * h) as usize;

        // Candidate 0: empty. Candidate 1: 2x2 block at (3,3)..(4,4).
        let mut masks = vec![0u8; plane_len];
        let mut block = vec![0u8; plane_len];
        for y in 3..5 {
            for x in 3..5 {
                block[y * w as usize + x] = 1;
            }
        }
        masks.extend_from_slice(&block);

        let result = MaskResult::new(w, h, masks, vec![0.2, 0.9]).unwrap();
        let (index, mask) = result.best_plane_image().unwrap();
        assert_eq!(index, 1);

        let alpha = feather_mask(&mask, 2);
        let source = RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        let cutout = composite_cutout(&source, &alpha).unwrap();

        // Inside the block: opaque, source color.
        assert_eq!(cutout.get_pixel(3, 3).0, [10, 20, 30, 255]);
        // Adjacent to the block: partial alpha.
        let edge = cutout.get_pixel(2, 3).0[3];
        assert!(edge > 0 && edge < 255, "edge alpha {edge} should be partial");
        // Far corner: fully transparent.
        assert_eq!(cutout.get_pixel(7, 7).0[3], 0);
    }
}
