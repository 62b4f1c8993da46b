//! Relay Module
//!
//! Chunk fan-out, the per-request pipeline, and the voice message service
//! that ties them to a messaging gateway.

mod coordinator;
mod pipeline;
mod service;

pub use coordinator::{AggregateReply, Dispatched, FanOutCoordinator, REPLY_DELIMITER, aggregate};
pub use pipeline::{Stage, VoicePipeline};
pub use service::{
    EMPTY_AUDIO_NOTICE, FAILURE_NOTICE, MAX_REPLY_CHARS, MessageGateway, NO_SPEECH_NOTICE, VoiceMessage, VoiceRelay,
    too_long_notice,
};
