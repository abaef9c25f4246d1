//! Error types for the modem simulation

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while setting up a virtual modem
#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration was not valid JSON for [`VirtualModemConfig`](crate::VirtualModemConfig)
    #[error("invalid modem configuration: {0}")]
    Json(#[from] serde_json::Error),
}
