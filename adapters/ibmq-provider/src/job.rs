//! Jobs submitted to IBM Q backends.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::api::{IbmqClient, JobInfo};
use crate::config::ClientConfig;
use crate::error::{IbmqError, IbmqResult};
use crate::qobj::JobResult;

/// Queue status reported for jobs that wait for a device.
const PENDING_IN_QUEUE: &str = "PENDING_IN_QUEUE";

/// Lifecycle of a remote job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Initializing,
    Validating,
    Queued,
    Running,
    Done,
    Cancelled,
    /// Failed; holds the API status string and the service's message, if any.
    Error(String),
}

impl JobStatus {
    /// Map an API job record onto a status.
    pub fn from_api(status: &str, queue_status: Option<&str>) -> Self {
        match status {
            "INITIALIZING" => Self::Initializing,
            "VALIDATING" => Self::Validating,
            "RUNNING" if queue_status == Some(PENDING_IN_QUEUE) => Self::Queued,
            "RUNNING" => Self::Running,
            "COMPLETED" => Self::Done,
            "CANCELLED" => Self::Cancelled,
            s if s.starts_with("ERROR") => Self::Error(s.to_string()),
            other => {
                tracing::debug!("unknown job status {other}, treating as running");
                Self::Running
            }
        }
    }

    fn from_info(info: &JobInfo) -> Self {
        let status = Self::from_api(
            &info.status,
            info.info_queue.as_ref().map(|q| q.status.as_str()),
        );
        match (status, &info.error) {
            (Self::Error(code), Some(err)) if !err.message.is_empty() => {
                Self::Error(format!("{code}: {}", err.message))
            }
            (status, _) => status,
        }
    }

    /// Whether the job will not change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Error(_))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Validating => write!(f, "validating"),
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Error(msg) => write!(f, "error ({msg})"),
        }
    }
}

/// Handle to a submitted job.
pub struct IbmqJob {
    id: String,
    backend_name: String,
    creation_date: Option<DateTime<Utc>>,
    client: Arc<IbmqClient>,
    config: Arc<ClientConfig>,
}

impl IbmqJob {
    pub(crate) fn new(
        info: &JobInfo,
        backend_name: String,
        client: Arc<IbmqClient>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            id: info.id.clone(),
            backend_name,
            creation_date: info.creation_date,
            client,
            config,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// When the service accepted the job.
    pub fn creation_date(&self) -> Option<DateTime<Utc>> {
        self.creation_date
    }

    /// Current status.
    pub async fn status(&self) -> IbmqResult<JobStatus> {
        let info = self.client.get_job_status(&self.id).await?;
        Ok(JobStatus::from_info(&info))
    }

    /// Wait for the job using the configured timeout.
    pub async fn result(&self) -> IbmqResult<JobResult> {
        self.result_with_timeout(self.config.job_timeout()).await
    }

    /// Poll until the job is terminal or `timeout` elapses.
    pub async fn result_with_timeout(&self, timeout: Duration) -> IbmqResult<JobResult> {
        let start = Instant::now();
        let poll_interval = self.config.poll_interval();

        loop {
            let status = self.status().await?;
            tracing::debug!("job {} is {status}", self.id);

            match status {
                JobStatus::Done => return self.fetch_result().await,
                JobStatus::Cancelled => return Err(IbmqError::JobCancelled(self.id.clone())),
                JobStatus::Error(msg) => {
                    return Err(IbmqError::JobFailed(format!("{}: {msg}", self.id)));
                }
                _ => {}
            }

            if start.elapsed() >= timeout {
                return Err(IbmqError::Timeout(self.id.clone()));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }

    async fn fetch_result(&self) -> IbmqResult<JobResult> {
        let info = self.client.get_job(&self.id).await?;
        match info.result {
            Some(mut result) => {
                if result.job_id.is_empty() {
                    result.job_id.clone_from(&self.id);
                }
                Ok(result)
            }
            None => Err(IbmqError::ApiError {
                code: None,
                message: format!("job {} completed without a result", self.id),
            }),
        }
    }

    /// Ask the service to cancel the job.
    pub async fn cancel(&self) -> IbmqResult<()> {
        self.client.cancel_job(&self.id).await?;
        tracing::info!("cancelled job {}", self.id);
        Ok(())
    }
}

impl fmt::Debug for IbmqJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmqJob")
            .field("id", &self.id)
            .field("backend", &self.backend_name)
            .field("creation_date", &self.creation_date)
            .finish()
    }
}
