//! Splits a source clip into encoded chunks no longer than a limit.

use super::{AudioChunk, SegmentSpan, Transcoder};
use crate::error::{RelayError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Plan `ceil(total / max_segment)` contiguous spans covering `[0, total)`.
pub fn plan_segments(total: Duration, max_segment: Duration) -> Result<Vec<SegmentSpan>> {
    if max_segment.is_zero() {
        return Err(RelayError::InvalidConfiguration(
            "segment length must be greater than zero".to_string(),
        ));
    }
    if total.is_zero() {
        return Err(RelayError::EmptyAudio);
    }

    let mut spans = Vec::new();
    let mut start = Duration::ZERO;
    while start < total {
        let duration = max_segment.min(total - start);
        spans.push(SegmentSpan {
            index: spans.len(),
            start,
            duration,
        });
        start += duration;
    }

    Ok(spans)
}

pub struct AudioSegmenter {
    transcoder: Arc<dyn Transcoder>,
    work_dir: PathBuf,
}

impl AudioSegmenter {
    pub fn new(transcoder: Arc<dyn Transcoder>, work_dir: PathBuf) -> Self {
        Self {
            transcoder,
            work_dir,
        }
    }

    /// Probe, plan and encode every segment of `source`.
    ///
    /// All-or-nothing: if any encode step fails, the chunks already written
    /// are deleted and `EncodingFailed` is returned.
    pub async fn segment(&self, source: &Path, max_segment: Duration) -> Result<Vec<AudioChunk>> {
        let total = self
            .transcoder
            .probe_duration(source)
            .await
            .map_err(|e| RelayError::Probe(e.to_string()))?;

        let spans = plan_segments(total, max_segment)?;
        tracing::debug!(
            total_secs = total.as_secs_f64(),
            max_segment_secs = max_segment.as_secs_f64(),
            chunks = spans.len(),
            "Planned segmentation"
        );

        tokio::fs::create_dir_all(&self.work_dir).await?;
        let batch = Uuid::new_v4();

        let mut chunks: Vec<AudioChunk> = Vec::with_capacity(spans.len());
        for span in spans {
            let output = self.work_dir.join(format!("{}_{}.ogg", batch, span.index));
            let chunk = AudioChunk::new(span, output);

            if let Err(e) = self.transcoder.encode(source, &span, chunk.path()).await {
                tracing::error!(chunk = span.index, "Segment encoding failed: {}", e);
                chunk.discard().await;
                for produced in chunks {
                    produced.discard().await;
                }
                return Err(RelayError::EncodingFailed {
                    index: span.index,
                    reason: e.to_string(),
                });
            }

            chunks.push(chunk);
        }

        Ok(chunks)
    }
}
