//! Drawing backend used to materialise annotations on a raster.
//!
//! Geometry arrives in canvas space (y up) and is flipped to raster rows
//! here. Strokes use round caps and joins.

use std::path::Path;

use image::{Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_polygon_mut,
};
use imageproc::point::Point;

use crate::error::Result;
use crate::models::{Rect, Vertex};

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Raster capabilities consumed by the evaluator.
pub trait DrawingBackend {
    fn dimensions(&self) -> (u32, u32);

    /// Strokes consecutive vertices with the given pen width.
    fn draw_polyline(&mut self, points: &[Vertex], width: u32, color: Rgb<u8>);

    /// Fills the raster span of `rect` (see [`Rect::raster_span`]).
    fn fill_rect(&mut self, rect: &Rect, color: Rgb<u8>);

    fn pixel_at(&self, x: u32, y: u32) -> Rgb<u8>;

    fn set_pixel_at(&mut self, x: u32, y: u32, color: Rgb<u8>);

    fn save_png(&self, path: &Path) -> Result<()>;
}

impl DrawingBackend for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbImage::dimensions(self)
    }

    fn draw_polyline(&mut self, points: &[Vertex], width: u32, color: Rgb<u8>) {
        let height = self.height();
        let raster: Vec<(i64, i64)> = points.iter().map(|v| v.to_raster(height)).collect();
        for pair in raster.windows(2) {
            if let Some((a, b)) = clip_segment(pair[0], pair[1]) {
                stroke_segment(self, a, b, width, color);
            }
        }
    }

    fn fill_rect(&mut self, rect: &Rect, color: Rgb<u8>) {
        let (w, h) = RgbImage::dimensions(self);
        if let Some((x0, y0, x1, y1)) = rect.raster_span(w, h) {
            let span = imageproc::rect::Rect::at(x0 as i32, y0 as i32).of_size(x1 - x0, y1 - y0);
            draw_filled_rect_mut(self, span, color);
        }
    }

    fn pixel_at(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.get_pixel(x, y)
    }

    fn set_pixel_at(&mut self, x: u32, y: u32, color: Rgb<u8>) {
        self.put_pixel(x, y, color);
    }

    fn save_png(&self, path: &Path) -> Result<()> {
        self.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Raster coordinates are clipped to `[-RASTER_LIMIT, RASTER_LIMIT]` before
/// reaching the `i32` drawing primitives.
const RASTER_LIMIT: i64 = 1 << 20;

/// Liang-Barsky clip of a raster segment against the drawing limits.
fn clip_segment(a: (i64, i64), b: (i64, i64)) -> Option<((i32, i32), (i32, i32))> {
    let limit = RASTER_LIMIT as f64;
    let (x0, y0) = (a.0 as f64, a.1 as f64);
    let (dx, dy) = (b.0 as f64 - x0, b.1 as f64 - y0);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [(-dx, x0 + limit), (dx, limit - x0), (-dy, y0 + limit), (dy, limit - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| ((x0 + t * dx).round() as i32, (y0 + t * dy).round() as i32);
    Some((at(t0), at(t1)))
}

fn stroke_segment(img: &mut RgbImage, a: (i32, i32), b: (i32, i32), width: u32, color: Rgb<u8>) {
    if width <= 1 {
        draw_line_segment_mut(img, (a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32), color);
        return;
    }

    let radius = (width / 2) as i32;
    draw_filled_circle_mut(img, a, radius, color);
    draw_filled_circle_mut(img, b, radius, color);

    let dx = (b.0 - a.0) as f32;
    let dy = (b.1 - a.1) as f32;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return;
    }
    let half = width as f32 / 2.0;
    let nx = -dy / len * half;
    let ny = dx / len * half;
    let corner = |p: (i32, i32), sign: f32| {
        Point::new(
            (p.0 as f32 + sign * nx).round() as i32,
            (p.1 as f32 + sign * ny).round() as i32,
        )
    };
    let quad = [corner(a, 1.0), corner(b, 1.0), corner(b, -1.0), corner(a, -1.0)];
    draw_polygon_mut(img, &quad, color);
}

/// HSL lightness, `(max + min) / 2` over the RGB channels.
pub fn lightness(px: Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let max = r.max(g).max(b) as u16;
    let min = r.min(g).min(b) as u16;
    ((max + min) / 2) as u8
}

/// HSV value, the brightest channel.
pub fn value(px: Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    r.max(g).max(b)
}
