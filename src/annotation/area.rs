use std::fs;
use std::path::Path;

use crate::annotation::tokens::{Tokens, write_vertex};
use crate::config::DataLayout;
use crate::error::Result;
use crate::models::{Georeference, Rect, Vertex};

/// Two-click rectangle entry state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerEntry {
    #[default]
    Idle,
    PendingFirstCorner(Vertex),
}

/// Set of axis-aligned exclusion rectangles.
#[derive(Debug, Clone, Default)]
pub struct Area {
    rectangles: Vec<Rect>,
    entry: CornerEntry,
}

impl Area {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P, georef: &Georeference) -> Result<Self> {
        let mut area = Area::new();
        area.load(path, georef)?;
        Ok(area)
    }

    pub fn rectangles(&self) -> &[Rect] {
        &self.rectangles
    }

    pub fn pending(&self) -> CornerEntry {
        self.entry
    }

    pub fn is_empty(&self) -> bool {
        self.rectangles.is_empty()
    }

    /// Feeds one click of the two-click protocol.
    ///
    /// The second click commits a min/max ordered rectangle unless it shares
    /// an x or y coordinate with the first one, in which case the pending
    /// corner is dropped.
    pub fn add_corner(&mut self, x: i32, y: i32) {
        let corner = Vertex::new(x, y);
        self.entry = match self.entry {
            CornerEntry::Idle => CornerEntry::PendingFirstCorner(corner),
            CornerEntry::PendingFirstCorner(first) => {
                if first.x != x && first.y != y {
                    self.rectangles.push(Rect::spanning(first, corner));
                }
                CornerEntry::Idle
            }
        };
    }

    /// Writes two "x y" lines per rectangle, min corner first.
    ///
    /// An empty area writes nothing.
    pub fn save<P: AsRef<Path>>(&self, path: P, georef: &Georeference) -> Result<()> {
        let path = path.as_ref();
        if self.rectangles.is_empty() {
            log::debug!("Area is empty, {:?} not written", path);
            return Ok(());
        }
        let mut out = String::new();
        for rect in &self.rectangles {
            let (min, max) = rect.normalized();
            write_vertex(&mut out, georef, min);
            write_vertex(&mut out, georef, max);
        }
        fs::write(path, out)?;
        log::debug!("Saved {} rectangles to {:?}", self.rectangles.len(), path);
        Ok(())
    }

    pub fn save_last(&self, layout: &DataLayout, georef: &Georeference) -> Result<()> {
        let path = layout.last_area();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.save(path, georef)
    }

    /// Appends the rectangles of an area file.
    ///
    /// Corners are kept in file order. A trailing unpaired corner is ignored.
    /// Nothing changes if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, georef: &Georeference) -> Result<()> {
        let text = fs::read_to_string(path.as_ref())?;
        let mut tokens = Tokens::new(&text);
        let mut loaded = Vec::new();
        while tokens.remaining() >= 4 {
            let first = tokens.next_vertex(georef, "area corner")?;
            let second = tokens.next_vertex(georef, "area corner")?;
            loaded.push(Rect::new(first, second));
        }
        if tokens.remaining() > 0 {
            log::debug!("Ignoring unpaired corner at end of {:?}", path.as_ref());
        }

        self.rectangles.extend(loaded);
        self.entry = CornerEntry::Idle;
        Ok(())
    }
}
