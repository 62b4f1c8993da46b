//! Fan-out / fan-in of chunk transcriptions.

use crate::audio::AudioChunk;
use crate::transcription::{TranscriptionClient, TranscriptionResult};
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Separator between chunk texts in the reply.
pub const REPLY_DELIMITER: &str = ". ";

/// The single reply assembled from all chunk outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateReply {
    Success(String),
    /// At least one chunk failed. Carries every chunk's text, errors included.
    Failure(String),
}

impl AggregateReply {
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

/// Fold index-ordered outcomes into one reply. Any error makes the whole
/// reply a failure.
pub fn aggregate(outcomes: &[TranscriptionResult]) -> AggregateReply {
    let text = outcomes
        .iter()
        .map(TranscriptionResult::text)
        .collect::<Vec<_>>()
        .join(REPLY_DELIMITER);

    if outcomes.iter().any(TranscriptionResult::is_error) {
        AggregateReply::Failure(text)
    } else {
        AggregateReply::Success(text)
    }
}

pub struct FanOutCoordinator {
    client: Arc<dyn TranscriptionClient>,
}

impl FanOutCoordinator {
    pub fn new(client: Arc<dyn TranscriptionClient>) -> Self {
        Self { client }
    }

    /// Transcribe every chunk concurrently and assemble the reply in chunk order.
    ///
    /// Every task runs to completion; a failing chunk does not cancel its
    /// siblings. Each chunk's file is deleted as soon as its own task is done.
    pub async fn process(&self, chunks: Vec<AudioChunk>) -> AggregateReply {
        self.dispatch(chunks).collect().await
    }

    /// Spawn one transcription task per chunk. Must be called inside a Tokio runtime.
    pub fn dispatch(&self, chunks: Vec<AudioChunk>) -> Dispatched {
        tracing::debug!(chunks = chunks.len(), "Dispatching chunk transcriptions");

        let handles = chunks
            .into_iter()
            .map(|chunk| {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = client.transcribe(&chunk).await;
                    chunk.discard().await;
                    result
                })
            })
            .collect();

        Dispatched { handles }
    }
}

/// In-flight chunk tasks, in chunk order.
pub struct Dispatched {
    handles: Vec<JoinHandle<TranscriptionResult>>,
}

impl Dispatched {
    /// Wait for every task and fold the outcomes into one reply.
    pub async fn collect(self) -> AggregateReply {
        let total = self.handles.len();

        // join_all yields results in handle order, which is chunk order.
        let outcomes: Vec<TranscriptionResult> = join_all(self.handles)
            .await
            .into_iter()
            .enumerate()
            .map(|(index, joined)| match joined {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(chunk = index, "Transcription task failed: {}", e);
                    TranscriptionResult::Error(format!("transcription task failed: {}", e))
                }
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.is_error()).count();
        tracing::debug!(chunks = total, failed, "Collected chunk transcriptions");

        aggregate(&outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SegmentSpan;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Answers by chunk index after a per-index delay, recording completion order.
    struct ScriptedClient {
        replies: HashMap<usize, TranscriptionResult>,
        delays_ms: HashMap<usize, u64>,
        completed: Mutex<Vec<usize>>,
    }

    impl ScriptedClient {
        fn new(replies: Vec<TranscriptionResult>) -> Self {
            Self {
                replies: replies.into_iter().enumerate().collect(),
                delays_ms: HashMap::new(),
                completed: Mutex::new(Vec::new()),
            }
        }

        fn with_delays(mut self, delays_ms: &[u64]) -> Self {
            self.delays_ms = delays_ms.iter().copied().enumerate().collect();
            self
        }
    }

    #[async_trait]
    impl TranscriptionClient for ScriptedClient {
        async fn transcribe(&self, chunk: &AudioChunk) -> TranscriptionResult {
            assert!(chunk.path().exists(), "chunk file must exist while transcribing");
            if let Some(ms) = self.delays_ms.get(&chunk.index()) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.completed.lock().unwrap().push(chunk.index());
            self.replies[&chunk.index()].clone()
        }
    }

    struct PanickingClient;

    #[async_trait]
    impl TranscriptionClient for PanickingClient {
        async fn transcribe(&self, chunk: &AudioChunk) -> TranscriptionResult {
            if chunk.index() == 1 {
                panic!("recognizer blew up");
            }
            TranscriptionResult::Text(format!("t{}", chunk.index()))
        }
    }

    fn text(s: &str) -> TranscriptionResult {
        TranscriptionResult::Text(s.to_string())
    }

    fn error(s: &str) -> TranscriptionResult {
        TranscriptionResult::Error(s.to_string())
    }

    fn chunks_in(dir: &Path, count: usize) -> (Vec<AudioChunk>, Vec<PathBuf>) {
        let mut chunks = Vec::new();
        let mut paths = Vec::new();
        for index in 0..count {
            let path = dir.join(format!("{}.ogg", index));
            std::fs::write(&path, b"opus").unwrap();
            paths.push(path.clone());
            chunks.push(AudioChunk::new(
                SegmentSpan {
                    index,
                    start: Duration::from_secs(7 * index as u64),
                    duration: Duration::from_secs(7),
                },
                path,
            ));
        }
        (chunks, paths)
    }

    #[test]
    fn test_aggregate_all_success() {
        let reply = aggregate(&[text("a"), text("b"), text("c")]);
        assert_eq!(reply, AggregateReply::Success("a. b. c".to_string()));
    }

    #[test]
    fn test_aggregate_failure_keeps_successful_texts() {
        let reply = aggregate(&[text("a"), error("timeout"), text("c")]);
        assert_eq!(reply, AggregateReply::Failure("a. timeout. c".to_string()));
    }

    #[test]
    fn test_aggregate_single_error_has_no_delimiter() {
        let reply = aggregate(&[error("bad audio")]);
        assert_eq!(reply, AggregateReply::Failure("bad audio".to_string()));
    }

    #[test]
    fn test_aggregate_empty() {
        assert_eq!(aggregate(&[]), AggregateReply::Success(String::new()));
    }

    #[tokio::test]
    async fn test_process_orders_by_index_not_completion() {
        let dir = tempfile::tempdir().unwrap();
        let (chunks, _) = chunks_in(dir.path(), 3);
        let client = Arc::new(
            ScriptedClient::new(vec![text("a"), text("b"), text("c")]).with_delays(&[120, 60, 0]),
        );
        let coordinator = FanOutCoordinator::new(client.clone());

        let reply = coordinator.process(chunks).await;

        assert_eq!(reply, AggregateReply::Success("a. b. c".to_string()));
        assert_eq!(*client.completed.lock().unwrap(), vec![2, 1, 0]);
    }

    #[tokio::test]
    async fn test_process_failure_dominates_and_siblings_complete() {
        let dir = tempfile::tempdir().unwrap();
        let (chunks, _) = chunks_in(dir.path(), 3);
        let client = Arc::new(
            ScriptedClient::new(vec![text("a"), error("timeout"), text("c")]).with_delays(&[50, 0, 50]),
        );
        let coordinator = FanOutCoordinator::new(client.clone());

        let reply = coordinator.process(chunks).await;

        assert_eq!(reply, AggregateReply::Failure("a. timeout. c".to_string()));
        assert_eq!(client.completed.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_process_is_repeatable() {
        let client = Arc::new(ScriptedClient::new(vec![text("a"), error("timeout"), text("c")]));
        let coordinator = FanOutCoordinator::new(client);

        let dir = tempfile::tempdir().unwrap();
        let (first, _) = chunks_in(dir.path(), 3);
        let first = coordinator.process(first).await;
        let (second, _) = chunks_in(dir.path(), 3);
        let second = coordinator.process(second).await;

        assert_eq!(first, second);
        assert!(first.is_failure());
    }

    #[tokio::test]
    async fn test_process_removes_every_chunk_file() {
        let dir = tempfile::tempdir().unwrap();
        let (chunks, paths) = chunks_in(dir.path(), 4);
        let client = Arc::new(ScriptedClient::new(vec![
            text("a"),
            error("boom"),
            text("c"),
            text("d"),
        ]));

        FanOutCoordinator::new(client).process(chunks).await;

        for path in paths {
            assert!(!path.exists(), "{} should be deleted", path.display());
        }
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_error_and_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let (chunks, paths) = chunks_in(dir.path(), 3);

        let reply = FanOutCoordinator::new(Arc::new(PanickingClient))
            .process(chunks)
            .await;

        assert!(reply.is_failure());
        assert!(reply.text().starts_with("t0. transcription task failed"));
        assert!(reply.text().ends_with(". t2"));
        for path in paths {
            assert!(!path.exists());
        }
    }
}
