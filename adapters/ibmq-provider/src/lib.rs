//! IBM Q Experience provider.
//!
//! Authenticates accounts against the IBM Q Experience REST API, lists the
//! remote backends each account can reach, and submits Qobj payloads to
//! them. Credentials come from [`ibmq_credentials`].
//!
//! # Backends
//!
//! | Kind | `properties()` | `defaults()` |
//! |------|----------------|--------------|
//! | Simulator (`ibmq_qasm_simulator`) | `None`, no request | `None`, no request |
//! | Device (`ibmqx4`, `ibmq_20_tokyo`, ...) | calibration data | pulse defaults, if published |
//!
//! Display names (`ibmq_5_tenerife`) and retired names
//! (`ibmqx_qasm_simulator`) are resolved by [`IbmqProvider::get_backend`].
//!
//! # Configuration
//!
//! HTTP timeouts and job polling come from [`ClientConfig`], loaded from an
//! optional YAML file and overridden by `IBMQ_HTTP_TIMEOUT_SECS`,
//! `IBMQ_CONNECT_TIMEOUT_SECS`, `IBMQ_POLL_INTERVAL_MS` and
//! `IBMQ_JOB_TIMEOUT_SECS`.
//!
//! # Example
//!
//! ```ignore
//! use ibmq_credentials::default_accounts_path;
//! use ibmq_provider::{IbmqProvider, Qobj};
//!
//! let mut provider = IbmqProvider::new();
//! provider.load_accounts(&default_accounts_path()?).await?;
//!
//! let backend = provider.get_backend("ibmq_qasm_simulator").await?;
//! let job = backend.run(&qobj).await?;
//! let result = job.result().await?;
//!
//! for (bits, count) in result.counts(0).unwrap_or_default() {
//!     println!("  {bits} : {count}");
//! }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod job;
pub mod provider;
pub mod qobj;

pub use backend::{BackendConfiguration, BackendProperties, BackendStatus, IbmqBackend};
pub use config::{ClientConfig, ConfigError};
pub use error::{IbmqError, IbmqResult};
pub use job::{IbmqJob, JobStatus};
pub use provider::{BackendFilter, IbmqProvider};
pub use qobj::{ExperimentResult, JobResult, Qobj, QobjExperiment};

// Re-export credential types used in this crate's signatures.
pub use ibmq_credentials::{Credentials, HubGroupProject};
