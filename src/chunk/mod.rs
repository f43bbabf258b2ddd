pub mod plan;
pub mod segment;

pub use plan::{chunk_path, plan, ChunkSpec, SegmentationPlan};
pub use segment::{SegmentReport, Segmenter};
