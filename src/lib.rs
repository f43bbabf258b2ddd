pub mod chunk;
pub mod config;
pub mod error;
pub mod extract;
pub mod media;
pub mod pipeline;
pub mod task_group;
pub mod workspace;

pub use config::Config;
pub use error::{Result, VidsplitError};
pub use pipeline::{print_summary, process_video, PipelineConfig, PipelineResult, PipelineStats};
