//! Loader error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the loaders in this crate.
///
/// The engine flattens these into its own loader-failure variant; the typed
/// form exists so loader callers and tests can match on the cause.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("question bank file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed question page {path}: {source}")]
    MalformedPage {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("requested range {start}..{} exceeds {total} questions", .start + .count)]
    OutOfRange {
        start: usize,
        count: usize,
        total: usize,
    },
}
