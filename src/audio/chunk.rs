//! Audio chunk and segment plan types.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// One planned slice of the source: `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSpan {
    pub index: usize,
    pub start: Duration,
    pub duration: Duration,
}

impl SegmentSpan {
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// An encoded segment on disk.
///
/// The backing file belongs to the chunk. Call [`AudioChunk::discard`] once the
/// chunk has been transcribed; a chunk dropped without discarding removes its
/// file synchronously instead.
#[derive(Debug)]
pub struct AudioChunk {
    span: SegmentSpan,
    path: PathBuf,
    discarded: bool,
}

impl AudioChunk {
    pub fn new(span: SegmentSpan, path: PathBuf) -> Self {
        Self {
            span,
            path,
            discarded: false,
        }
    }

    pub fn index(&self) -> usize {
        self.span.index
    }

    pub fn span(&self) -> &SegmentSpan {
        &self.span
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the encoded payload.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }

    /// Delete the backing file.
    pub async fn discard(mut self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    chunk = self.span.index,
                    path = %self.path.display(),
                    "Failed to delete chunk file: {}",
                    e
                );
            }
        }
        self.discarded = true;
    }
}

impl Drop for AudioChunk {
    fn drop(&mut self) {
        if self.discarded {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(
                chunk = self.span.index,
                path = %self.path.display(),
                "Failed to delete dropped chunk file: {}",
                e
            );
        }
    }
}
