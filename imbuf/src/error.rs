use std::fmt;

use imbuf_common::format_id::FormatId;

use crate::BoxError;

/// Lifecycle hook that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Init,
    Exit,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Exit => f.write_str("exit"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("No format with id {0} registered")]
    UnknownFormat(FormatId),
    #[error("No format registered for extension {0:?}")]
    UnknownExtension(String),
    #[error("No supported file type found")]
    NoSupportedFiletypeFound,
    #[error("{phase} hook of {format} failed: {source}")]
    Hook {
        format: FormatId,
        phase: HookPhase,
        source: BoxError,
    },
    #[error("{format}: {source}")]
    Codec { format: FormatId, source: BoxError },
    #[error("{0} can not be saved")]
    NoEncoder(FormatId),
    #[error("Format id {0} is registered more than once")]
    DuplicateFormatId(FormatId),
    #[error("Formats are already initialized")]
    AlreadyInitialized,
    #[error("Formats are not initialized")]
    NotInitialized,
    #[error("Image: {0}")]
    Image(#[from] imbuf_common::error::Error),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Format the error is about, if any
    pub fn format(&self) -> Option<FormatId> {
        match self {
            Self::UnknownFormat(format)
            | Self::NoEncoder(format)
            | Self::DuplicateFormatId(format)
            | Self::Hook { format, .. }
            | Self::Codec { format, .. } => Some(*format),
            _ => None,
        }
    }
}
