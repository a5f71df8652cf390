use std::io::{Read, Seek, SeekFrom};
use std::ops::Range;
use std::path::Path;

use crate::TransferError;

/// Reads arbitrary byte ranges of a file.
pub struct ChunkReader {
    file: std::fs::File,
    file_size: u64,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let file = std::fs::File::open(path)?;
        let file_size = file.metadata()?.len();
        Ok(Self { file, file_size })
    }

    /// Reads exactly the bytes of `range`.
    ///
    /// Fails with `UnexpectedEof` if the file shrank since it was planned.
    pub fn read_chunk(&mut self, range: Range<u64>) -> Result<Vec<u8>, TransferError> {
        let len = range.end.saturating_sub(range.start) as usize;
        let mut buf = vec![0u8; len];
        self.file.seek(SeekFrom::Start(range.start))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads the whole file.
    pub fn read_all(&mut self) -> Result<Vec<u8>, TransferError> {
        self.read_chunk(0..self.file_size)
    }

    /// Total file size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChunkPlan;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn chunks_reassemble_into_file() {
        let dir = TempDir::new().unwrap();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let path = create_test_file(dir.path(), "speech.wav", &data);

        let mut reader = ChunkReader::open(&path).unwrap();
        let plan = ChunkPlan::new(reader.file_size(), 1024).unwrap();

        let mut joined = Vec::new();
        for range in plan.ranges() {
            joined.extend(reader.read_chunk(range).unwrap());
        }
        assert_eq!(plan.total_chunks(), 10);
        assert_eq!(joined, data);
    }

    #[test]
    fn reads_out_of_order() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "a.pcm", b"abcdefghij");

        let mut reader = ChunkReader::open(&path).unwrap();
        assert_eq!(reader.read_chunk(5..10).unwrap(), b"fghij");
        assert_eq!(reader.read_chunk(0..3).unwrap(), b"abc");
    }

    #[test]
    fn read_past_end_fails() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "a.pcm", b"abc");

        let mut reader = ChunkReader::open(&path).unwrap();
        assert!(matches!(
            reader.read_chunk(0..10),
            Err(TransferError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn read_all_returns_contents() {
        let dir = TempDir::new().unwrap();
        let path = create_test_file(dir.path(), "a.flac", b"hello");
        let mut reader = ChunkReader::open(&path).unwrap();
        assert_eq!(reader.read_all().unwrap(), b"hello");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            ChunkReader::open(&dir.path().join("nope.wav")),
            Err(TransferError::Io(_))
        ));
    }
}
