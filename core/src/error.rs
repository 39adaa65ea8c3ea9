//! Error types for the bridge.

use std::path::PathBuf;

use thiserror::Error;

use crate::import::{CorrelationToken, ImportPurpose};

/// The picker collaborator could not present a chooser.
#[derive(Error, Debug)]
#[error("picker unavailable: {0}")]
pub struct PickerError(pub String);

/// Errors surfaced by the import coordinator.
///
/// Nothing here is fatal: each variant means one request did not produce a
/// hand-off.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{purpose} import already awaiting result (token {token})")]
    AlreadyPending {
        purpose: ImportPurpose,
        token: CorrelationToken,
    },
    #[error("no pending import for token {0}")]
    UnknownToken(CorrelationToken),
    #[error(transparent)]
    Picker(#[from] PickerError),
    #[error("failed to read picked {purpose} document: {source}")]
    Read {
        purpose: ImportPurpose,
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading a [`BridgeConfig`](crate::config::BridgeConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
