use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading images, models and lists.
#[derive(Debug, Error)]
pub enum FeatError {
    /// A file could not be opened or read.
    #[error("failed to open {}: {source}", .path.display())]
    OpenError {
        /// The file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The bytes are a known format but could not be decoded.
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    /// The bytes are not in any enabled image format.
    #[error("unsupported image format")]
    UnsupportedFormat,

    /// The image decoded to a width or height of zero.
    #[error("image dimensions are zero")]
    ZeroDimensions,

    /// A maximum edge of zero was requested.
    #[error("max edge must be > 0")]
    InvalidMaxEdge,

    /// The face model file is not a valid model.
    #[error("failed to load face model: {0}")]
    ModelError(String),

    /// A list line has no TAB separator.
    #[error("line {line}: expected <local_path><TAB><output_path>")]
    MalformedEntry {
        /// 1-based line number.
        line: usize,
    },

    /// A record could not be serialized.
    #[error("failed to serialize record: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Writing output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
