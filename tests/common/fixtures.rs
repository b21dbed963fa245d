use image::{DynamicImage, Rgb, RgbImage};
use roadtruth::{DataLayout, Georeference, Track};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Origin and scale shared by the file format tests.
pub const ORIGIN_X: i64 = 1000;
pub const ORIGIN_Y: i64 = 2000;
pub const SCALE: i64 = 500;

pub const DETECTED: Rgb<u8> = Rgb([255, 255, 255]);
pub const UNDETECTED: Rgb<u8> = Rgb([0, 0, 0]);

pub fn test_georef() -> Georeference {
    Georeference::new(ORIGIN_X, ORIGIN_Y, SCALE).expect("Valid georeference")
}

/// Creates a data layout rooted in a temporary directory.
/// Returns both the layout and the directory (which must be kept alive).
pub fn create_test_layout() -> (DataLayout, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let layout = DataLayout::new(dir.path());
    (layout, dir)
}

/// Writes `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, contents).expect("Failed to write test file");
}

/// Builds a track from pixel-space points.
pub fn make_track(points: &[(i32, i32)]) -> Track {
    let mut track = Track::new();
    for &(x, y) in points {
        track.add_point(x, y);
    }
    track
}

/// Saves a track as `roads/track_<id>.txt` below the layout root.
pub fn write_track(layout: &DataLayout, id: &str, points: &[(i32, i32)], georef: &Georeference) {
    let path = layout.track_file(id);
    fs::create_dir_all(path.parent().expect("Track file has a parent"))
        .expect("Failed to create roads directory");
    make_track(points)
        .save(&path, georef)
        .expect("Failed to save test track");
}

/// Writes a road set manifest listing the given track ids.
pub fn write_road_set(layout: &DataLayout, sector: &str, ids: &[&str]) {
    write_file(&layout.road_set(sector), &format!("{}\n", ids.join("\n")));
}

/// Detection map where exactly the listed raster pixels are detected.
pub fn detection_from_pixels(width: u32, height: u32, pixels: &[(u32, u32)]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, UNDETECTED);
    for &(x, y) in pixels {
        img.put_pixel(x, y, DETECTED);
    }
    DynamicImage::ImageRgb8(img)
}

/// Detection map where every pixel except the listed ones is detected.
pub fn detection_except_pixels(width: u32, height: u32, pixels: &[(u32, u32)]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, DETECTED);
    for &(x, y) in pixels {
        img.put_pixel(x, y, UNDETECTED);
    }
    DynamicImage::ImageRgb8(img)
}
