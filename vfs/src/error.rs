use std::io;

use thiserror::Error;

/// Failure reported by a bundle or storage provider.
#[derive(Error, Debug)]
pub enum VfsError {
    /// No entry at this provider path.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[source] io::Error),
    /// The path escapes the provider root or does not normalize.
    #[error("invalid path: {0}")]
    InvalidPath(String),
    /// A staged write could not be moved into place; the destination is untouched.
    #[error("failed to publish {path}: {source}")]
    Publish {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("provider is read-only")]
    ReadOnly,
}

impl From<io::Error> for VfsError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => VfsError::NotFound(err.to_string()),
            _ => VfsError::Io(err),
        }
    }
}
