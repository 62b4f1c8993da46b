//! One request through segmentation, dispatch and collection.

use super::coordinator::{AggregateReply, FanOutCoordinator};
use crate::audio::AudioSegmenter;
use crate::error::Result;
use std::path::Path;
use std::time::Duration;

/// Per-request stages. Only `Segmenting` can end in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Segmenting,
    Dispatching,
    Collecting,
    Done,
    Failed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Segmenting => "segmenting",
            Self::Dispatching => "dispatching",
            Self::Collecting => "collecting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct VoicePipeline {
    segmenter: AudioSegmenter,
    coordinator: FanOutCoordinator,
    max_segment: Duration,
}

impl VoicePipeline {
    pub fn new(segmenter: AudioSegmenter, coordinator: FanOutCoordinator, max_segment: Duration) -> Self {
        Self {
            segmenter,
            coordinator,
            max_segment,
        }
    }

    /// Segment `source` and transcribe every chunk.
    ///
    /// Errors only come from segmentation; chunk failures are part of the
    /// returned reply.
    pub async fn run(&self, source: &Path) -> Result<AggregateReply> {
        enter(Stage::Segmenting);
        let chunks = match self.segmenter.segment(source, self.max_segment).await {
            Ok(chunks) => chunks,
            Err(e) => {
                tracing::warn!(stage = %Stage::Failed, code = %e.code(), "Segmentation failed: {}", e);
                return Err(e);
            }
        };

        enter(Stage::Dispatching);
        let dispatched = self.coordinator.dispatch(chunks);

        enter(Stage::Collecting);
        let reply = dispatched.collect().await;

        enter(Stage::Done);
        Ok(reply)
    }
}

fn enter(stage: Stage) {
    tracing::debug!(stage = %stage, "Voice pipeline stage");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioChunk, SegmentSpan, TranscodeError, Transcoder};
    use crate::error::RelayError;
    use crate::transcription::{TranscriptionClient, TranscriptionResult};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedTranscoder {
        duration: Duration,
        fail: bool,
    }

    #[async_trait]
    impl Transcoder for FixedTranscoder {
        async fn probe_duration(&self, _source: &Path) -> std::result::Result<Duration, TranscodeError> {
            Ok(self.duration)
        }

        async fn encode(
            &self,
            _source: &Path,
            _span: &SegmentSpan,
            output: &Path,
        ) -> std::result::Result<(), TranscodeError> {
            if self.fail {
                return Err(TranscodeError::InvalidOutput("no audio stream".to_string()));
            }
            tokio::fs::write(output, b"opus").await.unwrap();
            Ok(())
        }
    }

    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TranscriptionClient for CountingClient {
        async fn transcribe(&self, chunk: &AudioChunk) -> TranscriptionResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            TranscriptionResult::Text(["a", "b", "c"][chunk.index()].to_string())
        }
    }

    fn pipeline(dir: &Path, transcoder: FixedTranscoder, client: Arc<CountingClient>, max: u64) -> VoicePipeline {
        VoicePipeline::new(
            AudioSegmenter::new(Arc::new(transcoder), dir.to_path_buf()),
            FanOutCoordinator::new(client),
            Duration::from_secs(max),
        )
    }

    #[tokio::test]
    async fn test_twenty_seconds_in_seven_second_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(CountingClient { calls: AtomicUsize::new(0) });
        let pipeline = pipeline(
            dir.path(),
            FixedTranscoder { duration: Duration::from_secs(20), fail: false },
            client.clone(),
            7,
        );

        let reply = pipeline.run(Path::new("voice.oga")).await.unwrap();

        assert_eq!(reply, AggregateReply::Success("a. b. c".to_string()));
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_encoding_failure_never_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(CountingClient { calls: AtomicUsize::new(0) });
        let pipeline = pipeline(
            dir.path(),
            FixedTranscoder { duration: Duration::from_secs(20), fail: true },
            client.clone(),
            7,
        );

        let err = pipeline.run(Path::new("voice.oga")).await.unwrap_err();

        assert!(matches!(err, RelayError::EncodingFailed { index: 0, .. }));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Segmenting.to_string(), "segmenting");
        assert_eq!(Stage::Failed.to_string(), "failed");
    }
}
