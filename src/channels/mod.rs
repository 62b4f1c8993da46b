//! Channel Integrations
//!
//! Messaging platforms the relay can sit behind. Each one implements
//! [`MessageGateway`](crate::relay::MessageGateway) and feeds voice events
//! into the relay channel.

#[cfg(feature = "telegram")]
pub mod telegram;
