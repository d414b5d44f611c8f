//! Error types for the huffman cli tool
use std::{fmt, io};

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, HuffError>;

/// The stage of an operation an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    OpenInput,
    CreateOutput,
    ReadInput,
    WriteOutput,
    Length,
    Tree,
    Payload,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::OpenInput => "opening input",
            Phase::CreateOutput => "creating output",
            Phase::ReadInput => "reading input",
            Phase::WriteOutput => "writing output",
            Phase::Length => "length field",
            Phase::Tree => "tree",
            Phase::Payload => "payload",
        };
        f.write_str(name)
    }
}

/// Errors produced by the huffman cli tool
#[derive(Debug, Error)]
pub enum HuffError {
    /// Wrong number of command line arguments
    #[error("invalid arguments: {0}")]
    InvalidArguments(&'static str),

    /// The mode selector was not recognized
    #[error("unsupported mode: {0:?} (expected huff or puff)")]
    UnsupportedMode(String),

    /// Reading or writing a file or stream failed
    #[error("io error while {phase}: {source}")]
    Io {
        phase: Phase,
        #[source]
        source: io::Error,
    },

    /// The compressed stream ended early or is otherwise malformed
    #[error("corrupt stream in {phase}: {detail}")]
    CorruptStream { phase: Phase, detail: String },

    /// The input does not fit the 32-bit length field
    #[error("input of {0} bytes is too large (limit is {max} bytes)", max = u32::MAX)]
    InputTooLarge(u64),
}

impl HuffError {
    /// Wraps an io error raised during `phase`.
    ///
    /// Running out of data or reading malformed data while decoding is
    /// reported as `CorruptStream`, every other failure as `Io`.
    pub fn io(phase: Phase, source: io::Error) -> Self {
        let decoding = matches!(phase, Phase::Length | Phase::Tree | Phase::Payload);
        let malformed = matches!(
            source.kind(),
            io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
        );
        if decoding && malformed {
            HuffError::CorruptStream {
                phase,
                detail: source.to_string(),
            }
        } else {
            HuffError::Io { phase, source }
        }
    }

    /// Shorthand for a `CorruptStream` error.
    pub fn corrupt(phase: Phase, detail: impl Into<String>) -> Self {
        HuffError::CorruptStream {
            phase,
            detail: detail.into(),
        }
    }

    /// Returns true for errors caused by a malformed compressed stream.
    pub fn is_corrupt(&self) -> bool {
        matches!(self, HuffError::CorruptStream { .. })
    }
}
