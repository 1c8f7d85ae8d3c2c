//! Alpha compositing: cut a source image out against a feathered
//! alpha plane.

use image::Rgba;

use crate::types::{GrayImage, MaskError, RgbaImage};

/// Composite a source image against an alpha plane into a transparent
/// cutout.
///
/// Every output pixel takes its color channels from `source` and its
/// alpha channel from `alpha`; pixels with alpha 0 are fully
/// transparent. The operation is per-pixel and O(width * height),
/// allocating only the output image.
///
/// # Errors
///
/// Returns [`MaskError::DimensionMismatch`] if the source and alpha
/// dimensions differ.
pub fn composite_cutout(source: &RgbaImage, alpha: &GrayImage) -> Result<RgbaImage, MaskError> {
    if source.dimensions() != alpha.dimensions() {
        return Err(MaskError::DimensionMismatch {
            source_width: source.width(),
            source_height: source.height(),
            alpha_width: alpha.width(),
            alpha_height: alpha.height(),
        });
    }

    Ok(RgbaImage::from_fn(
        source.width(),
        source.height(),
        |x, y| {
            let src = source.get_pixel(x, y).0;
            let a = alpha.get_pixel(x, y).0[0];
            Rgba([src[0], src[1], src[2], a])
        },
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::Luma;

    /// 4x4 source with a distinct color per pixel and opaque alpha.
    fn gradient_source() -> RgbaImage {
        #[allow(clippy::cast_possible_truncation)]
        RgbaImage::from_fn(4, 4, |x, y| {
            Rgba([(x * 50) as u8, (y * 50) as u8, (x + y) as u8, 255])
        })
    }

    #[test]
    fn zero_alpha_pixels_are_fully_transparent() {
        let source = gradient_source();
        let alpha = GrayImage::new(4, 4);
        let out = composite_cutout(&source, &alpha).unwrap();
        assert!(out.pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn full_alpha_pixels_keep_source_rgb() {
        let source = gradient_source();
        let alpha = GrayImage::from_pixel(4, 4, Luma([255]));
        let out = composite_cutout(&source, &alpha).unwrap();
        for (src, dst) in source.pixels().zip(out.pixels()) {
            assert_eq!(&src.0[..3], &dst.0[..3]);
            assert_eq!(dst.0[3], 255);
        }
    }

    #[test]
    fn intermediate_alpha_lands_in_alpha_channel() {
        let source = gradient_source();
        let alpha = GrayImage::from_pixel(4, 4, Luma([97]));
        let out = composite_cutout(&source, &alpha).unwrap();
        assert!(out.pixels().all(|p| p.0[3] == 97));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let source = gradient_source();
        let alpha = GrayImage::new(4, 5);
        let err = composite_cutout(&source, &alpha).unwrap_err();
        assert_eq!(
            err,
            MaskError::DimensionMismatch {
                source_width: 4,
                source_height: 4,
                alpha_width: 4,
                alpha_height: 5,
            }
        );
    }
}
