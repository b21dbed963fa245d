//! Editable ground-truth annotations and their text file formats.
//!
//! Coordinates are stored in pixels and written as absolute integer
//! millimeters through a [`Georeference`](crate::models::Georeference).

mod area;
mod tokens;
mod track;

pub use area::{Area, CornerEntry};
pub use track::{CUT_MARKER_SPREAD, DEFAULT_WIDTH, EditTarget, Track};

pub(crate) use tokens::Tokens;
