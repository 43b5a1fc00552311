//! Error types for frame decoding, configuration and channel observation.

use thiserror::Error;

/// Why a raw frame could not be turned into a packet.
///
/// Every variant drops the frame it came from and nothing else; callers are
/// expected to log and carry on with the next frame.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed msgpack frame: {0}")]
    Malformed(#[from] rmpv::decode::Error),

    #[error("top-level value is not a sequence")]
    NotASequence,

    #[error("packet tag missing or not a string")]
    MissingTag,

    #[error("packet '{tag}' has no payload sequence at data[1][0]")]
    MissingPayload { tag: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown resource category '{0}'")]
    UnknownCategory(String),
}

/// Registering a frame observer on a channel failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not observe channel: {reason}")]
pub struct ObserveError {
    pub reason: String,
}

impl ObserveError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
