//! Error types for credential storage.

use std::path::PathBuf;

use thiserror::Error;

use crate::credentials::HubGroupProject;

/// Result type for credential operations.
pub type CredentialsResult<T> = Result<T, CredentialsError>;

/// Errors that can occur while reading or writing stored credentials.
///
/// Reading from the environment never fails; these only come from the
/// accounts file.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// Accounts file could not be read or written.
    #[error("Failed to access accounts file {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Accounts file is not valid YAML or has the wrong shape.
    #[error("Invalid accounts file {path}: {source}")]
    Yaml {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// An account with the same hub/group/project is already stored.
    #[error("Credentials for {0} already stored. Use overwrite to replace them.")]
    AlreadyStored(HubGroupProject),

    /// No stored account matches.
    #[error("No stored credentials for {0}")]
    NotFound(HubGroupProject),

    /// Platform has no configuration directory and no override was given.
    #[error("Could not determine configuration directory. Set IBMQ_ACCOUNTS_FILE.")]
    NoConfigDir,
}
