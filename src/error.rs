//! Error types for every fallible operation of the library.
//!
//! Compiler diagnostics are not errors: they are data attached to a
//! translation unit. These enums only describe failures of the API itself.

use std::io;
use std::path::PathBuf;

use text_size::TextRange;
use thiserror::Error;

/// Failure to create a translation unit.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("failed to read main file '{}'", path.display())]
    Failure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A compiler argument the front end cannot honour.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("argument to '{0}' is missing")]
    MissingValue(String),

    #[error("language not recognized: '{0}'")]
    UnknownLanguage(String),

    #[error("invalid value '{0}' in '-std='")]
    InvalidStandard(String),
}

impl From<ArgumentError> for ParseError {
    fn from(err: ArgumentError) -> Self {
        ParseError::InvalidArguments(err.to_string())
    }
}

impl From<ArgumentError> for RefactorError {
    fn from(err: ArgumentError) -> Self {
        RefactorError::InvalidArguments(err.to_string())
    }
}

/// Failure to refresh a translation unit. The unit keeps its previous tree.
#[derive(Debug, Error)]
pub enum ReparseError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("failed to read main file '{}'", path.display())]
    Failure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("{line}:{column} is outside the buffer")]
    InvalidLocation { line: u32, column: u32 },

    #[error("offset {0} is outside the buffer")]
    InvalidOffset(u32),

    #[error("range spans two buffers")]
    CrossBufferRange,

    #[error("file is not part of this translation unit")]
    UnknownFile,
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to write '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode translation unit: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode translation unit: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("not a saved translation unit: {0}")]
    Format(String),
}

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("overlapping edits in '{}': {first:?} and {second:?}", file.display())]
    OverlappingEdits {
        file: PathBuf,
        first: TextRange,
        second: TextRange,
    },

    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Failure of the virtual-file-overlay and module-map writers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

#[derive(Debug, Error)]
pub enum RefactorError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("no renamable declaration at this location")]
    NoCursor,

    #[error("failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Location(#[from] LocationError),
}
