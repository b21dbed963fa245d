use crate::error::{Error, Result};

/// Integer pixel position in canvas space (y axis pointing up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Vertex {
    pub x: i32,
    pub y: i32,
}

impl Vertex {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: Vertex) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    pub fn distance(&self, other: Vertex) -> f32 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx.hypot(dy) as f32
    }

    /// Integer midpoint, truncating toward zero.
    pub fn midpoint(&self, other: Vertex) -> Vertex {
        let mid = |a: i32, b: i32| ((a as i64 + b as i64) / 2) as i32;
        Vertex::new(mid(self.x, other.x), mid(self.y, other.y))
    }

    /// Raster column/row of this vertex on a canvas of the given height.
    pub fn to_raster(&self, height: u32) -> (i64, i64) {
        (self.x as i64, height as i64 - 1 - self.y as i64)
    }
}

impl From<(i32, i32)> for Vertex {
    fn from((x, y): (i32, i32)) -> Self {
        Vertex::new(x, y)
    }
}

/// Axis-aligned rectangle stored as two opposite corners.
///
/// Corners are kept in the order they were given. Rectangles built
/// with [`Rect::spanning`] are min/max ordered, rectangles read back
/// from a file may not be, so consumers go through [`Rect::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub first: Vertex,
    pub second: Vertex,
}

impl Rect {
    pub const fn new(first: Vertex, second: Vertex) -> Self {
        Self { first, second }
    }

    /// Rectangle whose corners are the elementwise min and max of `a` and `b`.
    pub fn spanning(a: Vertex, b: Vertex) -> Self {
        Self {
            first: Vertex::new(a.x.min(b.x), a.y.min(b.y)),
            second: Vertex::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn normalized(&self) -> (Vertex, Vertex) {
        let r = Rect::spanning(self.first, self.second);
        (r.first, r.second)
    }

    pub fn width(&self) -> u32 {
        self.first.x.abs_diff(self.second.x)
    }

    pub fn height(&self) -> u32 {
        self.first.y.abs_diff(self.second.y)
    }

    /// Raster span `(x0, y0, x1, y1)`, end-exclusive, clipped to the canvas.
    ///
    /// Columns cover `[xmin, xmax)` and rows cover
    /// `[height - 1 - ymax, height - 1 - ymin)`. Returns `None` when
    /// nothing of the rectangle lands on the canvas.
    pub fn raster_span(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let (min, max) = self.normalized();
        let top = height as i64 - 1;
        let x0 = (min.x as i64).max(0);
        let x1 = (max.x as i64).min(width as i64);
        let y0 = (top - max.y as i64).max(0);
        let y1 = (top - min.y as i64).min(height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

/// Pixel to absolute millimeter conversion: `absolute = origin + pixel * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Georeference {
    origin_x: i64,
    origin_y: i64,
    scale: i64,
}

impl Georeference {
    pub fn new(origin_x: i64, origin_y: i64, scale: i64) -> Result<Self> {
        if scale <= 0 {
            return Err(Error::InvalidScale(scale));
        }
        Ok(Self {
            origin_x,
            origin_y,
            scale,
        })
    }

    pub fn origin(&self) -> (i64, i64) {
        (self.origin_x, self.origin_y)
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }

    pub fn to_absolute(&self, v: Vertex) -> (i64, i64) {
        (
            self.origin_x.saturating_add((v.x as i64).saturating_mul(self.scale)),
            self.origin_y.saturating_add((v.y as i64).saturating_mul(self.scale)),
        )
    }

    /// Floor division back to pixel space.
    ///
    /// Fails when the pixel offset does not fit an `i32`.
    pub fn to_pixel(&self, x: i64, y: i64) -> Result<Vertex> {
        let axis = |abs: i64, origin: i64| {
            i32::try_from(abs.saturating_sub(origin).div_euclid(self.scale)).ok()
        };
        match (axis(x, self.origin_x), axis(y, self.origin_y)) {
            (Some(px), Some(py)) => Ok(Vertex::new(px, py)),
            _ => Err(Error::CoordinateOutOfRange { x, y }),
        }
    }
}
