//! Row measurement, size caching, and the concurrent recomputation
//! engine.

pub mod cache;
pub mod engine;
pub mod height_index;
pub mod measure;

pub use cache::SizeCache;
pub use engine::{relayout_row, LayoutCompletion, LayoutEngine, LayoutUpdate, DEFAULT_CHUNK_SIZE};
pub use height_index::HeightIndex;
pub use measure::measure_row;
