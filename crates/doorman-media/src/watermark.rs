//! Watermark composite.
//!
//! Cosmetic step: a missing or undecodable watermark asset disables
//! watermarking instead of failing the pipeline.

use std::path::Path;
use tracing::warn;

const MARGIN: i64 = 16;

/// Composite `watermark_path` onto the bottom-right corner of the image at
/// `image_path`, in place. Returns whether a watermark was applied.
pub fn apply(image_path: &Path, watermark_path: &Path) -> bool {
    if !watermark_path.exists() {
        warn!(
            "watermark asset {} not found, skipping",
            watermark_path.display()
        );
        return false;
    }

    let mut base = match image::open(image_path) {
        Ok(img) => img.into_rgba8(),
        Err(e) => {
            warn!("could not decode {} for watermarking: {e}", image_path.display());
            return false;
        }
    };
    let mark = match image::open(watermark_path) {
        Ok(img) => img.into_rgba8(),
        Err(e) => {
            warn!("could not decode watermark {}: {e}", watermark_path.display());
            return false;
        }
    };

    if mark.width() >= base.width() || mark.height() >= base.height() {
        warn!("watermark larger than image, skipping");
        return false;
    }

    let x = base.width() as i64 - mark.width() as i64 - MARGIN;
    let y = base.height() as i64 - mark.height() as i64 - MARGIN;
    image::imageops::overlay(&mut base, &mark, x.max(0), y.max(0));

    match base.save(image_path) {
        Ok(()) => true,
        Err(e) => {
            warn!("could not save watermarked image: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(path: &Path, w: u32, h: u32, px: Rgba<u8>) {
        let img = RgbaImage::from_pixel(w, h, px);
        img.save(path).unwrap();
    }

    #[test]
    fn test_missing_asset_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("art.png");
        write_png(&img, 64, 64, Rgba([10, 20, 30, 255]));
        let before = std::fs::read(&img).unwrap();

        assert!(!apply(&img, &dir.path().join("nope.png")));
        assert_eq!(std::fs::read(&img).unwrap(), before, "image must be untouched");
    }

    #[test]
    fn test_watermark_is_composited() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("art.png");
        let mark = dir.path().join("mark.png");
        write_png(&img, 64, 64, Rgba([0, 0, 0, 255]));
        write_png(&mark, 8, 8, Rgba([255, 255, 255, 255]));

        assert!(apply(&img, &mark));
        let out = image::open(&img).unwrap().into_rgba8();
        // Bottom-right corner region now carries the white mark.
        assert_eq!(out.get_pixel(44, 44), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_oversized_watermark_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("art.png");
        let mark = dir.path().join("mark.png");
        write_png(&img, 16, 16, Rgba([0, 0, 0, 255]));
        write_png(&mark, 32, 32, Rgba([255, 255, 255, 255]));
        assert!(!apply(&img, &mark));
    }
}
