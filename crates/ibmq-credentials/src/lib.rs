//! IBM Q Experience account credentials.
//!
//! This crate knows where account credentials come from and how they are
//! keyed. It never talks to the network.
//!
//! # Sources
//!
//! | Source | Function | Failure mode |
//! |--------|----------|--------------|
//! | Environment (`QE_*`) | [`read_credentials_from_environ`] | silent empty result |
//! | Accounts file (YAML) | [`read_credentials_from_file`] | [`CredentialsError`] |
//! | Both, env first | [`discover_credentials`] | [`CredentialsError`] from the file |
//!
//! # Environment
//!
//! ```bash
//! export QE_TOKEN="your-api-token"
//! export QE_URL="https://quantumexperience.ng.bluemix.net/api"
//! # optional routing
//! export QE_HUB="ibm-q" QE_GROUP="open" QE_PROJECT="main"
//! ```
//!
//! # Example
//!
//! ```
//! use ibmq_credentials::read_credentials_from_lookup;
//!
//! let env = |name: &str| match name {
//!     "QE_TOKEN" => Some("abc".to_string()),
//!     "QE_URL" => Some("http://x".to_string()),
//!     _ => None,
//! };
//! let found = read_credentials_from_lookup(env);
//! assert_eq!(found.len(), 1);
//! ```

mod credentials;
mod discover;
mod environ;
mod error;
mod store;

pub use credentials::{Credentials, HubGroupProject};
pub use discover::{discover_credentials, discover_credentials_from_lookup};
pub use environ::{
    VARIABLES_MAP, read_credentials_from_environ, read_credentials_from_lookup,
};
pub use error::{CredentialsError, CredentialsResult};
pub use store::{
    ACCOUNTS_FILE_ENV, default_accounts_path, read_credentials_from_file, remove_credentials,
    store_credentials,
};

/// Credentials keyed by their unique [`HubGroupProject`] id.
pub type CredentialsMap = std::collections::BTreeMap<HubGroupProject, Credentials>;
