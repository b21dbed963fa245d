use image::RgbImage;

use crate::annotation::Track;
use crate::raster::{self, BLACK, DrawingBackend, WHITE};

/// Rendered intensity below which a scratch pixel belongs to the ground truth.
pub const INK_THRESHOLD: u8 = 10;

/// Index of a track in a [`GroundTruthSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackId(pub usize);

/// Loaded reference tracks and their rasterized footprints.
///
/// Pixel positions are raster coordinates (row 0 at the top).
#[derive(Debug, Clone, Default)]
pub struct GroundTruthSet {
    tracks: Vec<Track>,
    centerline: Vec<(u32, u32)>,
    buffered: Vec<(u32, u32)>,
}

impl GroundTruthSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, track: Track) -> TrackId {
        self.tracks.push(track);
        TrackId(self.tracks.len() - 1)
    }

    pub fn get(&self, id: TrackId) -> Option<&Track> {
        self.tracks.get(id.0)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Drops the tracks and both pixel sets.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.centerline.clear();
        self.buffered.clear();
    }

    pub fn centerline_pixels(&self) -> &[(u32, u32)] {
        &self.centerline
    }

    pub fn buffered_pixels(&self) -> &[(u32, u32)] {
        &self.buffered
    }

    /// Recomputes both pixel sets on a `width` x `height` canvas.
    pub fn rasterize(&mut self, width: u32, height: u32, tolerance_width: u32) {
        let mut scratch = RgbImage::new(width, height);
        self.centerline = self.render(&mut scratch, 1);
        self.buffered = self.render(&mut scratch, tolerance_width);
        log::debug!(
            "Ground truth: {} tracks, {} centerline pixels, {} buffered pixels",
            self.tracks.len(),
            self.centerline.len(),
            self.buffered.len()
        );
    }

    fn render(&self, scratch: &mut RgbImage, stroke: u32) -> Vec<(u32, u32)> {
        scratch.pixels_mut().for_each(|px| *px = WHITE);
        for track in &self.tracks {
            scratch.draw_polyline(track.points(), stroke, BLACK);
        }
        scratch
            .enumerate_pixels()
            .filter(|(_, _, px)| raster::value(**px) < INK_THRESHOLD)
            .map(|(x, y, _)| (x, y))
            .collect()
    }
}
