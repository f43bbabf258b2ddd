use std::path::{Path, PathBuf};

use crate::error::{Result, VidsplitError};

/// Upper bound on chunks per plan; anything larger is a broken duration.
pub const MAX_CHUNKS: usize = 1_000_000;

/// How a media duration divides into fixed-size chunks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationPlan {
    /// Chunks of exactly `chunk_size` seconds.
    pub full_chunks: usize,
    /// Length of the final partial chunk, 0 when there is none.
    pub trailing_duration: f64,
    pub total_chunks: usize,
}

/// One planned chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSpec {
    pub index: usize,
    pub start_secs: u64,
    pub duration_secs: f64,
    pub output_path: PathBuf,
}

/// Plan fixed-size chunks covering `total_duration` seconds.
pub fn plan(total_duration: f64, chunk_size: i64) -> Result<SegmentationPlan> {
    if chunk_size <= 0 {
        return Err(VidsplitError::InvalidChunkSize(chunk_size));
    }
    if !total_duration.is_finite() || total_duration < 0.0 {
        return Err(VidsplitError::InvalidDuration(total_duration));
    }

    let size = chunk_size as f64;
    if total_duration / size > MAX_CHUNKS as f64 {
        return Err(VidsplitError::InvalidDuration(total_duration));
    }

    let full_chunks = (total_duration / size).floor();
    let remainder = total_duration - full_chunks * size;

    // Exact multiples can leave a zero or slightly negative remainder.
    let (trailing_duration, trailing_count) = if remainder > 0.0 {
        (remainder, 1)
    } else {
        (0.0, 0)
    };

    let full_chunks = full_chunks as usize;
    Ok(SegmentationPlan {
        full_chunks,
        trailing_duration,
        total_chunks: full_chunks + trailing_count,
    })
}

impl SegmentationPlan {
    pub fn has_trailing_chunk(&self) -> bool {
        self.trailing_duration > 0.0
    }

    /// Yield the chunk specs in index order.
    ///
    /// `chunk_size` must be the size the plan was computed with.
    pub fn chunk_specs<'a>(
        &'a self,
        chunk_size: i64,
        dir: &'a Path,
        base_name: &'a str,
        extension: &'a str,
    ) -> impl Iterator<Item = ChunkSpec> + 'a {
        let size = chunk_size.max(0) as u64;
        let full = (0..self.full_chunks).map(move |index| ChunkSpec {
            index,
            start_secs: index as u64 * size,
            duration_secs: size as f64,
            output_path: chunk_path(dir, base_name, index, extension),
        });

        let trailing = self.has_trailing_chunk().then(|| ChunkSpec {
            index: self.full_chunks,
            start_secs: self.full_chunks as u64 * size,
            duration_secs: self.trailing_duration,
            output_path: chunk_path(dir, base_name, self.full_chunks, extension),
        });

        full.chain(trailing)
    }
}

/// `{dir}/{base_name}_chunk_{index:03}.{extension}`
pub fn chunk_path(dir: &Path, base_name: &str, index: usize, extension: &str) -> PathBuf {
    dir.join(format!("{base_name}_chunk_{index:03}.{extension}"))
}
