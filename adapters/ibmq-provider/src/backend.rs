//! Remote IBM Q backends.

use std::fmt;
use std::sync::Arc;

use ibmq_credentials::HubGroupProject;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::IbmqClient;
use crate::config::ClientConfig;
use crate::error::IbmqResult;
use crate::job::IbmqJob;
use crate::qobj::Qobj;

/// Static description of a backend, as published by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfiguration {
    pub backend_name: String,
    #[serde(default)]
    pub backend_version: String,
    pub n_qubits: u32,
    #[serde(default)]
    pub basis_gates: Vec<String>,
    pub simulator: bool,
    #[serde(default)]
    pub local: bool,
    #[serde(default)]
    pub conditional: bool,
    #[serde(default)]
    pub open_pulse: bool,
    #[serde(default)]
    pub memory: bool,
    #[serde(default)]
    pub max_shots: u64,
    /// Directed qubit pairs; absent means all-to-all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupling_map: Option<Vec<[u32; 2]>>,
    /// Fields not modelled above (`gates`, `description`, `online_date`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Live availability of a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub backend_name: String,
    pub backend_version: String,
    /// Whether the backend accepts jobs.
    pub operational: bool,
    /// Jobs waiting in the queue.
    pub pending_jobs: u64,
    /// Free-form status message (`active`, `maintenance`, ...).
    pub status_msg: String,
}

/// Calibration data of a real device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendProperties {
    pub backend_name: String,
    #[serde(default)]
    pub backend_version: String,
    #[serde(default)]
    pub last_update_date: Option<String>,
    /// Per-qubit measurements (T1, T2, frequency, readout error, ...).
    #[serde(default)]
    pub qubits: Vec<Vec<Nduv>>,
    #[serde(default)]
    pub gates: Vec<GateProperties>,
    #[serde(default)]
    pub general: Vec<Nduv>,
}

/// Name, date, unit, value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nduv {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub unit: String,
    pub value: f64,
}

/// Calibration of one gate on specific qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateProperties {
    pub gate: String,
    pub qubits: Vec<u32>,
    #[serde(default)]
    pub parameters: Vec<Nduv>,
}

/// A backend reachable through one enabled account.
#[derive(Clone)]
pub struct IbmqBackend {
    client: Arc<IbmqClient>,
    configuration: BackendConfiguration,
    config: Arc<ClientConfig>,
}

impl IbmqBackend {
    pub(crate) fn new(
        client: Arc<IbmqClient>,
        configuration: BackendConfiguration,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            client,
            configuration,
            config,
        }
    }

    /// Backend name.
    pub fn name(&self) -> &str {
        &self.configuration.backend_name
    }

    /// Static configuration. Never touches the network.
    pub fn configuration(&self) -> &BackendConfiguration {
        &self.configuration
    }

    /// Account this backend was listed under.
    pub fn account(&self) -> HubGroupProject {
        self.client.credentials().unique_id()
    }

    pub fn is_simulator(&self) -> bool {
        self.configuration.simulator
    }

    /// Current queue status.
    pub async fn status(&self) -> IbmqResult<BackendStatus> {
        let mut status = self.client.backend_status(self.name()).await?;
        if status.backend_version.is_empty() {
            status.backend_version = self.configuration.backend_version.clone();
        }
        Ok(status)
    }

    /// Calibration properties. Simulators have none.
    pub async fn properties(&self) -> IbmqResult<Option<BackendProperties>> {
        if self.is_simulator() {
            return Ok(None);
        }
        self.client.backend_properties(self.name()).await
    }

    /// Pulse defaults. Simulators have none.
    pub async fn defaults(&self) -> IbmqResult<Option<Value>> {
        if self.is_simulator() {
            return Ok(None);
        }
        self.client.backend_defaults(self.name()).await
    }

    /// Submit a Qobj and return a handle to the job.
    pub async fn run(&self, qobj: &Qobj) -> IbmqResult<IbmqJob> {
        let info = self.client.submit_job(self.name(), qobj).await?;
        tracing::info!("submitted job {} to {}", info.id, self.name());

        Ok(IbmqJob::new(
            &info,
            self.name().to_string(),
            Arc::clone(&self.client),
            Arc::clone(&self.config),
        ))
    }
}

impl PartialEq for IbmqBackend {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.account() == other.account()
    }
}

impl Eq for IbmqBackend {}

impl fmt::Debug for IbmqBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmqBackend")
            .field("name", &self.name())
            .field("account", &self.account())
            .field("simulator", &self.configuration.simulator)
            .field("n_qubits", &self.configuration.n_qubits)
            .finish()
    }
}

impl fmt::Display for IbmqBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<IbmqBackend('{}') from {}>", self.name(), self.account())
    }
}
