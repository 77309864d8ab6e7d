//! Error type for the encode/decode pipeline.
//!
//! Every failure is deterministic for a given key and image, so none of
//! these are retried by callers.

use thiserror::Error;

/// Errors that can occur while encoding text or decoding an image with a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Encoding was asked to process an empty string.
    #[error("input text is empty")]
    EmptyInput,

    /// The key string is not a well-formed command stream.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// The key lacks one of the commands every decode needs.
    #[error("invalid key: missing '{tag}' ({name}) command", tag = .0.tag(), name = .0.name())]
    MissingRequiredCommand(RequiredCommand),

    /// A recorded matrix has no inverse modulo 256.
    #[error("matrix transform is not invertible modulo 256")]
    NonInvertibleTransform,

    /// The key's parameters do not fit the supplied image.
    #[error("key does not match image: {0}")]
    DataDesynchronized(String),

    /// Encoder options or a forced channel subset cannot be used.
    #[error("invalid encode options: {0}")]
    InvalidOptions(String),
}

/// The two commands a key must always carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredCommand {
    ChannelShuffle,
    DummyPadding,
}

impl RequiredCommand {
    /// Type tag used in the key string.
    pub fn tag(self) -> char {
        match self {
            RequiredCommand::ChannelShuffle => 's',
            RequiredCommand::DummyPadding => 'd',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RequiredCommand::ChannelShuffle => "channel shuffle",
            RequiredCommand::DummyPadding => "dummy pixels",
        }
    }
}
