//! Error types for the IBM Q provider.

use ibmq_credentials::{CredentialsError, HubGroupProject};
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for IBM Q operations.
pub type IbmqResult<T> = Result<T, IbmqError>;

/// Errors that can occur when talking to IBM Q Experience.
#[derive(Debug, Error)]
pub enum IbmqError {
    /// No credentials in the environment or the accounts file.
    #[error(
        "No IBM Q credentials found. Set QE_TOKEN and QE_URL or store an account with `ibmq account save`."
    )]
    NoCredentials,

    /// Token cannot be sent as an HTTP header.
    #[error("Invalid IBM Q API token")]
    InvalidToken,

    /// Login was rejected by the API.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// An account with the same hub/group/project is already enabled.
    #[error("Credentials for {0} are already in use")]
    CredentialsInUse(HubGroupProject),

    /// No backend matches the requested name.
    #[error("Backend not found: {0}")]
    BackendNotFound(String),

    /// More than one enabled account offers the requested backend.
    #[error("More than one backend matches '{name}' (accounts: {accounts})")]
    AmbiguousBackend {
        /// Requested name.
        name: String,
        /// Accounts offering a backend with that name.
        accounts: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("IBM Q API error: {message}")]
    ApiError {
        /// Error code from API.
        code: Option<String>,
        /// Error message.
        message: String,
    },

    /// Job not found.
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Job ended in an error state.
    #[error("Job failed: {0}")]
    JobFailed(String),

    /// Job was cancelled.
    #[error("Job was cancelled: {0}")]
    JobCancelled(String),

    /// Timeout waiting for job.
    #[error("Timeout waiting for job {0}")]
    Timeout(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Stored credentials could not be read or written.
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// Client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid parameter.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
