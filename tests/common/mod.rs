mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from roadtruth for tests
pub use roadtruth::evaluation::{ClassMap, PixelClass, Tally};
pub use roadtruth::{
    Area, Config, CornerEntry, DataLayout, EditTarget, Error, Evaluator, Georeference, Rect,
    Track, Vertex,
};
