use image::{Rgb, RgbImage};

use crate::evaluation::metrics::Tally;
use crate::models::Rect;

/// Per-pixel state of one classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelClass {
    #[default]
    Unmarked,
    /// Inside a discarded area, ignored by counting
    Excluded,
    /// Candidate coverage laid down by the mark phase
    Covered,
    /// Counted as a true positive
    Matched,
    /// Counted as a miss
    Missed,
}

impl PixelClass {
    /// Diagnostic colour of the class.
    pub fn color(self) -> Rgb<u8> {
        match self {
            PixelClass::Unmarked => Rgb([0, 0, 0]),
            PixelClass::Excluded => Rgb([255, 0, 0]),
            PixelClass::Covered => Rgb([127, 127, 127]),
            PixelClass::Matched => Rgb([0, 255, 0]),
            PixelClass::Missed => Rgb([0, 0, 255]),
        }
    }
}

/// Canvas-sized grid of [`PixelClass`], indexed in raster coordinates.
#[derive(Debug, Clone, Default)]
pub struct ClassMap {
    width: u32,
    height: u32,
    cells: Vec<PixelClass>,
}

impl ClassMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![PixelClass::Unmarked; width as usize * height as usize],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> PixelClass {
        self.cells[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, class: PixelClass) {
        let i = self.index(x, y);
        self.cells[i] = class;
    }

    pub fn clear(&mut self) {
        self.cells.fill(PixelClass::Unmarked);
    }

    /// Marks the raster span of every rectangle as excluded.
    pub fn mark_excluded(&mut self, rects: &[Rect]) {
        for rect in rects {
            let Some((x0, y0, x1, y1)) = rect.raster_span(self.width, self.height) else {
                continue;
            };
            for y in y0..y1 {
                for x in x0..x1 {
                    self.set(x, y, PixelClass::Excluded);
                }
            }
        }
    }

    /// Lays down a coverage mark unless the pixel is excluded.
    pub fn mark_covered(&mut self, x: u32, y: u32) {
        if self.get(x, y) != PixelClass::Excluded {
            self.set(x, y, PixelClass::Covered);
        }
    }

    /// Counts one pixel against the marks: covered is a hit, anything
    /// else outside exclusions is a miss.
    pub fn count(&mut self, x: u32, y: u32, tally: &mut Tally) {
        match self.get(x, y) {
            PixelClass::Covered => {
                self.set(x, y, PixelClass::Matched);
                tally.hit();
            }
            PixelClass::Excluded => {}
            _ => {
                self.set(x, y, PixelClass::Missed);
                tally.miss();
            }
        }
    }

    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| self.get(x, y).color())
    }
}
