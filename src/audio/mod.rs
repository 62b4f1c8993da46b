//! Audio Module
//!
//! Segment planning, chunk files, and the ffmpeg-backed transcoder.

mod chunk;
mod segmenter;
mod transcoder;

pub use chunk::{AudioChunk, SegmentSpan};
pub use segmenter::{AudioSegmenter, plan_segments};
pub use transcoder::{FfmpegTranscoder, TranscodeError, Transcoder};
