use std::fs;
use std::path::{Path, PathBuf};

use crate::annotation::tokens::{Tokens, write_vertex};
use crate::config::DataLayout;
use crate::error::Result;
use crate::models::{Georeference, Vertex};

/// Width assigned to a fresh track.
pub const DEFAULT_WIDTH: i32 = 6;

/// Offset of the side cut markers from the central one.
pub const CUT_MARKER_SPREAD: i32 = 6;

/// Squared selection radius (3 pixels, exclusive).
const SELECT_RADIUS_SQ: i64 = 9;

const MIN_WIDTH_STEP: i32 = 2;

/// Which vertex list the edit operations act upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditTarget {
    #[default]
    Points,
    Cuts,
}

/// One delineated road: an editable polyline plus its cut markers.
#[derive(Debug, Clone)]
pub struct Track {
    points: Vec<Vertex>,
    cuts: Vec<Vertex>,
    active_point: Option<usize>,
    active_cut: Option<usize>,
    target: EditTarget,
    width: i32,
    name: Option<PathBuf>,
}

impl Track {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            cuts: Vec::new(),
            active_point: None,
            active_cut: None,
            target: EditTarget::Points,
            width: DEFAULT_WIDTH,
            name: None,
        }
    }

    /// Loads a track file into a fresh track.
    pub fn from_file<P: AsRef<Path>>(path: P, georef: &Georeference) -> Result<Self> {
        let mut track = Track::new();
        track.load(path, georef)?;
        Ok(track)
    }

    pub fn points(&self) -> &[Vertex] {
        &self.points
    }

    pub fn cuts(&self) -> &[Vertex] {
        &self.cuts
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    /// File the track was loaded from, if any.
    pub fn name(&self) -> Option<&Path> {
        self.name.as_deref()
    }

    pub fn target(&self) -> EditTarget {
        self.target
    }

    pub fn is_cut_mode(&self) -> bool {
        self.target == EditTarget::Cuts
    }

    /// Active index in the current target list.
    pub fn active_index(&self) -> Option<usize> {
        match self.target {
            EditTarget::Points => self.active_point,
            EditTarget::Cuts => self.active_cut,
        }
    }

    fn slot_mut(&mut self, target: EditTarget) -> (&mut Vec<Vertex>, &mut Option<usize>) {
        match target {
            EditTarget::Points => (&mut self.points, &mut self.active_point),
            EditTarget::Cuts => (&mut self.cuts, &mut self.active_cut),
        }
    }

    fn slot(&self, target: EditTarget) -> (&[Vertex], Option<usize>) {
        match target {
            EditTarget::Points => (&self.points, self.active_point),
            EditTarget::Cuts => (&self.cuts, self.active_cut),
        }
    }

    pub fn add_point(&mut self, x: i32, y: i32) {
        let (list, active) = self.slot_mut(self.target);
        list.push(Vertex::new(x, y));
        *active = Some(list.len() - 1);
    }

    pub fn move_point(&mut self, x: i32, y: i32) {
        let (list, active) = self.slot_mut(self.target);
        if let Some(v) = active.and_then(|i| list.get_mut(i)) {
            *v = Vertex::new(x, y);
        }
    }

    /// Removes the active vertex.
    ///
    /// On the point list the selection falls back to the preceding vertex,
    /// on the cut list it is cleared.
    pub fn withdraw_active(&mut self) {
        let target = self.target;
        let (list, active) = self.slot_mut(target);
        let Some(index) = *active else { return };
        if index >= list.len() {
            return;
        }
        list.remove(index);
        *active = match target {
            EditTarget::Points => index.checked_sub(1),
            EditTarget::Cuts => None,
        };
    }

    /// Inserts the midpoint between the active vertex and its successor.
    pub fn add_middle(&mut self) {
        if self.target != EditTarget::Points {
            return;
        }
        let Some(index) = self.active_point else { return };
        if index + 1 >= self.points.len() {
            return;
        }
        let mid = self.points[index].midpoint(self.points[index + 1]);
        self.points.insert(index + 1, mid);
        self.active_point = Some(index + 1);
    }

    pub fn unselect(&mut self) {
        self.active_point = None;
    }

    /// Selects the first vertex of the target list closer than 3 pixels.
    pub fn select_point(&mut self, x: i32, y: i32) -> bool {
        let query = Vertex::new(x, y);
        let (list, active) = self.slot_mut(self.target);
        *active = list
            .iter()
            .position(|v| v.distance_sq(query) < SELECT_RADIUS_SQ);
        active.is_some()
    }

    /// Steps the point selection by `dir`, staying within `[0, len - 2]`.
    ///
    /// The last vertex cannot be reached this way.
    pub fn select_next(&mut self, dir: i32) {
        let Some(index) = self.active_point else { return };
        let next = index as i64 + dir as i64;
        if next >= 0 && next <= self.points.len() as i64 - 2 {
            self.active_point = Some(next as usize);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_index().is_some()
    }

    /// Toggles between point and cut editing, clearing both selections.
    ///
    /// Entering cut mode on a track without cuts seeds three markers
    /// across each end of the polyline.
    pub fn switch_cut_mode(&mut self) {
        self.target = match self.target {
            EditTarget::Points => EditTarget::Cuts,
            EditTarget::Cuts => EditTarget::Points,
        };
        self.active_point = None;
        self.active_cut = None;

        let n = self.points.len();
        if self.target == EditTarget::Cuts && self.cuts.is_empty() && n >= 2 {
            let head = end_markers(self.points[0], self.points[1]);
            let tail = end_markers(self.points[n - 1], self.points[n - 2]);
            self.cuts.extend(head);
            self.cuts.extend(tail);
        }
    }

    /// Active vertex of the target list, `(0, 0)` when nothing is selected.
    pub fn active(&self) -> Vertex {
        let (list, active) = self.slot(self.target);
        active.and_then(|i| list.get(i).copied()).unwrap_or_default()
    }

    /// Half the summed segment lengths of the polyline.
    pub fn length(&self) -> f32 {
        let total: f32 = self
            .points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum();
        total * 0.5
    }

    pub fn inc_width(&mut self, val: i32) {
        self.width += val;
        let _step = val.max(MIN_WIDTH_STEP);
    }

    /// Writes the track in the versioned text format.
    ///
    /// A track without points writes nothing.
    pub fn save<P: AsRef<Path>>(&self, path: P, georef: &Georeference) -> Result<()> {
        let path = path.as_ref();
        if self.points.is_empty() {
            log::debug!("Track has no points, {:?} not written", path);
            return Ok(());
        }
        fs::write(path, self.to_text(georef))?;
        log::debug!("Saved track ({} points, {} cuts) to {:?}", self.points.len(), self.cuts.len(), path);
        Ok(())
    }

    /// Saves to the "last track" slot of the data layout.
    pub fn save_last(&self, layout: &DataLayout, georef: &Georeference) -> Result<()> {
        let path = layout.last_track();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        self.save(path, georef)
    }

    fn to_text(&self, georef: &Georeference) -> String {
        let mut out = format!("0 {}\n{}\n", self.width, self.points.len());
        for &v in &self.points {
            write_vertex(&mut out, georef, v);
        }
        out.push_str(&format!("{}\n", self.cuts.len()));
        for &v in &self.cuts {
            write_vertex(&mut out, georef, v);
        }
        out
    }

    /// Replaces the track content with the file content.
    ///
    /// Both the versioned format (leading `0 <width>`) and the legacy one
    /// (leading point count) are accepted. The track is left untouched if
    /// the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, georef: &Georeference) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let parsed = TrackFile::parse(&text, georef)?;

        self.points = parsed.points;
        self.cuts = parsed.cuts;
        self.active_point = None;
        self.active_cut = None;
        if let Some(width) = parsed.width {
            self.width = width;
        }
        self.name = Some(path.to_path_buf());
        Ok(())
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new()
    }
}

struct TrackFile {
    width: Option<i32>,
    points: Vec<Vertex>,
    cuts: Vec<Vertex>,
}

impl TrackFile {
    fn parse(text: &str, georef: &Georeference) -> Result<Self> {
        let mut tokens = Tokens::new(text);
        let mut width = None;
        let mut count: usize = tokens.next("point count")?;
        if count == 0 {
            width = Some(tokens.next("width")?);
            count = tokens.next("point count")?;
        }
        let points = read_vertices(&mut tokens, count, georef, "track point")?;
        let count: usize = tokens.next("cut count")?;
        let cuts = read_vertices(&mut tokens, count, georef, "cut point")?;
        Ok(Self { width, points, cuts })
    }
}

fn read_vertices(
    tokens: &mut Tokens<'_>,
    count: usize,
    georef: &Georeference,
    what: &'static str,
) -> Result<Vec<Vertex>> {
    (0..count).map(|_| tokens.next_vertex(georef, what)).collect()
}

/// Three markers across the road at `end`, facing away from `neighbour`.
fn end_markers(end: Vertex, neighbour: Vertex) -> [Vertex; 3] {
    let dx = neighbour.x as i64 - end.x as i64;
    let dy = neighbour.y as i64 - end.y as i64;
    if dy.abs() > dx.abs() {
        let y = if dy < 0 { end.y.saturating_add(1) } else { end.y.saturating_sub(1) };
        [
            Vertex::new(end.x, y),
            Vertex::new(end.x.saturating_sub(CUT_MARKER_SPREAD), y),
            Vertex::new(end.x.saturating_add(CUT_MARKER_SPREAD), y),
        ]
    } else {
        let x = if dx < 0 { end.x.saturating_add(1) } else { end.x.saturating_sub(1) };
        [
            Vertex::new(x, end.y),
            Vertex::new(x, end.y.saturating_sub(CUT_MARKER_SPREAD)),
            Vertex::new(x, end.y.saturating_add(CUT_MARKER_SPREAD)),
        ]
    }
}
