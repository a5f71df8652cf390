use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::TransferError;

/// Splits a file of `file_size` bytes into fixed-size byte ranges.
///
/// Chunk `i` covers `[i * chunk_size, min(file_size, (i + 1) * chunk_size))`.
/// The last chunk may be shorter; an empty file has no chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    file_size: u64,
    chunk_size: u64,
}

impl ChunkPlan {
    /// Creates a plan. A zero chunk size is rejected.
    pub fn new(file_size: u64, chunk_size: u64) -> Result<Self, TransferError> {
        if chunk_size == 0 {
            return Err(TransferError::InvalidChunkSize);
        }
        Ok(Self {
            file_size,
            chunk_size,
        })
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Number of chunks: `ceil(file_size / chunk_size)`.
    pub fn total_chunks(&self) -> u64 {
        self.file_size.div_ceil(self.chunk_size)
    }

    /// Byte range of chunk `index`.
    pub fn range(&self, index: u64) -> Result<Range<u64>, TransferError> {
        let total = self.total_chunks();
        if index >= total {
            return Err(TransferError::ChunkOutOfRange { index, total });
        }
        let start = index * self.chunk_size;
        let end = self.file_size.min(start + self.chunk_size);
        Ok(start..end)
    }

    /// All chunk ranges in ascending order.
    pub fn ranges(&self) -> impl Iterator<Item = Range<u64>> + '_ {
        (0..self.total_chunks()).map(move |i| {
            let start = i * self.chunk_size;
            start..self.file_size.min(start + self.chunk_size)
        })
    }
}

/// Lifecycle of an upload task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Pending,
    InProgress,
    Completed,
    Failed(String),
}

/// One file being pushed into a session chunk by chunk.
///
/// The current index only moves forward and never passes the total; the
/// task is complete exactly when every chunk has been acknowledged.
#[derive(Debug, Clone)]
pub struct UploadTask {
    path: PathBuf,
    filename: String,
    session_id: String,
    plan: ChunkPlan,
    current_index: u64,
    status: UploadStatus,
}

impl UploadTask {
    /// Creates a pending task for `path` with a known size.
    pub fn new(
        path: impl Into<PathBuf>,
        session_id: impl Into<String>,
        file_size: u64,
        chunk_size: u64,
    ) -> Result<Self, TransferError> {
        let path = path.into();
        let filename = file_name_of(&path)?;
        Ok(Self {
            path,
            filename,
            session_id: session_id.into(),
            plan: ChunkPlan::new(file_size, chunk_size)?,
            current_index: 0,
            status: UploadStatus::Pending,
        })
    }

    /// Creates a pending task, reading the size from the file's metadata.
    pub fn from_file(
        path: impl Into<PathBuf>,
        session_id: impl Into<String>,
        chunk_size: u64,
    ) -> Result<Self, TransferError> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        Self::new(path, session_id, size, chunk_size)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn plan(&self) -> &ChunkPlan {
        &self.plan
    }

    pub fn file_size(&self) -> u64 {
        self.plan.file_size()
    }

    pub fn total_chunks(&self) -> u64 {
        self.plan.total_chunks()
    }

    /// Index of the next chunk to send.
    pub fn current_index(&self) -> u64 {
        self.current_index
    }

    /// Byte range of the next chunk to send.
    pub fn current_range(&self) -> Result<Range<u64>, TransferError> {
        self.plan.range(self.current_index)
    }

    pub fn is_complete(&self) -> bool {
        self.current_index == self.total_chunks()
    }

    /// Records the acknowledgment of the current chunk.
    pub fn advance(&mut self) -> Result<(), TransferError> {
        if self.is_complete() {
            return Err(TransferError::TaskComplete);
        }
        self.current_index += 1;
        Ok(())
    }

    /// Acknowledged chunks as a percentage of the total.
    pub fn progress_percent(&self) -> f64 {
        let total = self.total_chunks();
        if total == 0 {
            return 100.0;
        }
        self.current_index as f64 / total as f64 * 100.0
    }

    pub fn status(&self) -> &UploadStatus {
        &self.status
    }

    pub fn start(&mut self) {
        self.status = UploadStatus::InProgress;
    }

    pub fn complete(&mut self) {
        self.status = UploadStatus::Completed;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = UploadStatus::Failed(message.into());
    }
}

fn file_name_of(path: &Path) -> Result<String, TransferError> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransferError::MissingFileName(path.display().to_string()))
}
