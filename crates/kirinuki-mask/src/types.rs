//! Shared types for mask compositing.

use image::Luma;

use crate::select::best_candidate;

/// Re-export `GrayImage` so downstream crates can reference mask and
/// alpha planes without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbaImage` so downstream crates can reference source
/// images and composites without depending on `image` directly.
pub use image::RgbaImage;

/// One decode response from the inference engine: a set of candidate
/// binary masks with per-candidate confidence scores.
///
/// The mask data is a single flat buffer holding `scores.len()`
/// contiguous planes of `width * height` bytes each; plane *k*
/// occupies bytes `[k * w * h, (k + 1) * w * h)`. Cells are nominally
/// 0 or 1, but any nonzero byte is treated as foreground.
///
/// One instance exists per decode response. Superseded results are
/// discarded by the caller, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskResult {
    width: u32,
    height: u32,
    masks: Vec<u8>,
    scores: Vec<f32>,
}

impl MaskResult {
    /// Create a mask result, validating the plane-buffer invariant.
    ///
    /// # Errors
    ///
    /// Returns [`MaskError::PlaneMismatch`] if `masks.len()` is not
    /// exactly `scores.len() * width * height`.
    pub fn new(
        width: u32,
        height: u32,
        masks: Vec<u8>,
        scores: Vec<f32>,
    ) -> Result<Self, MaskError> {
        let plane_len = width as usize * height as usize;
        if masks.len() != scores.len() * plane_len {
            return Err(MaskError::PlaneMismatch {
                width,
                height,
                candidates: scores.len(),
                actual: masks.len(),
            });
        }
        Ok(Self {
            width,
            height,
            masks,
            scores,
        })
    }

    /// Plane width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Plane height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of candidate masks.
    #[must_use]
    pub const fn candidate_count(&self) -> usize {
        self.scores.len()
    }

    /// Per-candidate confidence scores, in plane order.
    #[must_use]
    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Raw bytes of candidate plane `index`, or `None` if out of range.
    #[must_use]
    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        let plane_len = self.width as usize * self.height as usize;
        if index >= self.scores.len() {
            return None;
        }
        self.masks.get(index * plane_len..(index + 1) * plane_len)
    }

    /// Candidate plane `index` as a binary `GrayImage`: zero cells
    /// stay 0, nonzero cells become 255.
    ///
    /// Returns `None` if `index` is out of range.
    #[must_use]
    pub fn plane_image(&self, index: usize) -> Option<GrayImage> {
        let plane = self.plane(index)?;
        let w = self.width as usize;
        Some(GrayImage::from_fn(self.width, self.height, |x, y| {
            let cell = plane[y as usize * w + x as usize];
            Luma([if cell == 0 { 0 } else { 255 }])
        }))
    }

    /// The highest-scoring candidate plane, as `(index, image)`.
    ///
    /// Ties resolve to the lowest index. Returns `None` if the result
    /// holds no candidates.
    #[must_use]
    pub fn best_plane_image(&self) -> Option<(usize, GrayImage)> {
        let index = best_candidate(&self.scores)?;
        let image = self.plane_image(index)?;
        Some((index, image))
    }
}

/// Errors that can occur in mask compositing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MaskError {
    /// The flat mask buffer does not hold a whole number of planes
    /// matching the score count.
    #[error(
        "mask buffer of {actual} bytes does not hold {candidates} planes of {width}x{height}"
    )]
    PlaneMismatch {
        /// Plane width in pixels.
        width: u32,
        /// Plane height in pixels.
        height: u32,
        /// Number of candidates (length of the score vector).
        candidates: usize,
        /// Actual buffer length in bytes.
        actual: usize,
    },

    /// Source image and alpha plane dimensions differ.
    #[error(
        "source image is {source_width}x{source_height} but alpha plane is {alpha_width}x{alpha_height}"
    )]
    DimensionMismatch {
        /// Source image width.
        source_width: u32,
        /// Source image height.
        source_height: u32,
        /// Alpha plane width.
        alpha_width: u32,
        /// Alpha plane height.
        alpha_height: u32,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_matching_buffer() {
        let result = MaskResult::new(2, 2, vec![0; 8], vec![0.5, 0.9]);
        assert!(result.is_ok());
        let result = result.unwrap();
        assert_eq!(result.candidate_count(), 2);
        assert_eq!(result.width(), 2);
        assert_eq!(result.height(), 2);
    }

    #[test]
    fn new_rejects_short_buffer() {
        let err = MaskResult::new(2, 2, vec![0; 7], vec![0.5, 0.9]).unwrap_err();
        assert_eq!(
            err,
            MaskError::PlaneMismatch {
                width: 2,
                height: 2,
                candidates: 2,
                actual: 7,
            }
        );
    }

    #[test]
    fn new_accepts_zero_candidates() {
        let result = MaskResult::new(4, 4, Vec::new(), Vec::new()).unwrap();
        assert_eq!(result.candidate_count(), 0);
        assert!(result.plane(0).is_none());
        assert!(result.best_plane_image().is_none());
    }

    #[test]
    fn plane_slices_at_correct_offsets() {
        // Two 2x2 planes: first all ones, second all twos.
        let masks = vec![1, 1, 1, 1, 2, 2, 2, 2];
        let result = MaskResult::new(2, 2, masks, vec![0.1, 0.2]).unwrap();
        assert_eq!(result.plane(0).unwrap(), &[1, 1, 1, 1]);
        assert_eq!(result.plane(1).unwrap(), &[2, 2, 2, 2]);
        assert!(result.plane(2).is_none());
    }

    #[test]
    fn plane_image_binarizes_nonzero_cells() {
        let masks = vec![0, 1, 7, 0];
        let result = MaskResult::new(2, 2, masks, vec![1.0]).unwrap();
        let image = result.plane_image(0).unwrap();
        assert_eq!(image.get_pixel(0, 0).0[0], 0);
        assert_eq!(image.get_pixel(1, 0).0[0], 255);
        assert_eq!(image.get_pixel(0, 1).0[0], 255);
        assert_eq!(image.get_pixel(1, 1).0[0], 0);
    }

    #[test]
    fn best_plane_image_picks_argmax() {
        // Plane 0 is empty, plane 1 is full; plane 1 scores higher.
        let mut masks = vec![0; 4];
        masks.extend_from_slice(&[1, 1, 1, 1]);
        let result = MaskResult::new(2, 2, masks, vec![0.3, 0.8]).unwrap();
        let (index, image) = result.best_plane_image().unwrap();
        assert_eq!(index, 1);
        assert!(image.pixels().all(|p| p.0[0] == 255));
    }
}
