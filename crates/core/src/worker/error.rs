use std::path::PathBuf;

use thiserror::Error;

/// Fatal worker failure. The loop stops at the first one.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("worker stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to extract faces from {path}: {message}")]
    Extraction { path: PathBuf, message: String },
    #[error("failed to serialize result for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
