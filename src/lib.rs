pub mod annotation;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod raster;

pub use annotation::{Area, CornerEntry, EditTarget, Track};
pub use config::{Config, DataLayout};
pub use error::{Error, Result};
pub use evaluation::{Evaluator, Scores};
pub use models::{Georeference, Rect, Vertex};
