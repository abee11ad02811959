//! Fixtures shared by the CLI tests.

use facecat_core::BoundingBox;
use image::RgbImage;

/// Small square face box with its top-left corner at (x, 1).
pub fn face_box(x: f32) -> BoundingBox {
    BoundingBox {
        x,
        y: 1.0,
        width: 4.0,
        height: 4.0,
        confidence: 0.9,
        landmarks: None,
    }
}

/// Write a plain PNG into `dir` and return its path.
pub fn write_photo(dir: &std::path::Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(32, 24, image::Rgb([90, 120, 150]))
        .save(&path)
        .expect("write test photo");
    path
}
