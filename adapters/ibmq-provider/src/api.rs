//! IBM Q Experience REST API client.
//!
//! One client per account. It implements:
//! - Login with an API token (`/users/loginWithToken`)
//! - Listing backend configurations, globally or per hub/group/project
//! - Backend queue status, calibration properties and pulse defaults
//! - Submitting Qobj jobs, polling them and cancelling them
//!
//! Job routes live under `/Network/{hub}/Groups/{group}/Projects/{project}`
//! when the account carries full routing, and at the API root otherwise.

use std::fmt;

use chrono::{DateTime, Utc};
use ibmq_credentials::Credentials;
use reqwest::{Client, Response, header};
use serde::Deserialize;
use serde_json::Value;

use crate::backend::{BackendProperties, BackendStatus};
use crate::config::ClientConfig;
use crate::error::{IbmqError, IbmqResult};
use crate::qobj::{JobResult, Qobj};

/// Header carrying the access token obtained at login.
pub const ACCESS_TOKEN_HEADER: &str = "x-access-token";

/// User-Agent sent with requests.
const USER_AGENT: &str = concat!("ibmq-rs/", env!("CARGO_PKG_VERSION"));

/// IBM Q Experience API client for one account.
pub struct IbmqClient {
    /// HTTP client with the access token installed.
    client: Client,
    /// Account credentials.
    credentials: Credentials,
}

impl fmt::Debug for IbmqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IbmqClient")
            .field("url", &self.credentials.url())
            .field("account", &self.credentials.unique_id())
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Login response.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    /// Access token.
    id: String,
    #[serde(default, rename = "userId")]
    user_id: Option<String>,
}

impl IbmqClient {
    /// Exchange the API token for an access token and build the client.
    pub async fn login(credentials: Credentials, config: &ClientConfig) -> IbmqResult<Self> {
        let login_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!credentials.verify())
            .build()?;

        let url = format!("{}/users/loginWithToken", credentials.url());
        tracing::debug!("POST {url}");

        let response = login_client
            .post(&url)
            .json(&serde_json::json!({ "apiToken": credentials.token() }))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            let message = error_message(response).await;
            return Err(IbmqError::AuthenticationFailed(message));
        }
        let login: LoginResponse = check(response).await?.json().await?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::HeaderName::from_static(ACCESS_TOKEN_HEADER),
            header::HeaderValue::from_str(&login.id).map_err(|_| IbmqError::InvalidToken)?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.http_timeout())
            .connect_timeout(config.connect_timeout())
            .danger_accept_invalid_certs(!credentials.verify())
            .build()?;

        tracing::info!(
            user_id = login.user_id.as_deref().unwrap_or("unknown"),
            "logged in to {} as account {}",
            credentials.url(),
            credentials.unique_id()
        );

        Ok(Self {
            client,
            credentials,
        })
    }

    /// Credentials this client was built from.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Root for job routes (hub-scoped when routing is complete).
    fn job_root(&self) -> String {
        let creds = &self.credentials;
        match (creds.hub(), creds.group(), creds.project()) {
            (Some(hub), Some(group), Some(project)) => format!(
                "{}/Network/{hub}/Groups/{group}/Projects/{project}",
                creds.url()
            ),
            _ => creds.url().to_string(),
        }
    }

    /// Raw configurations of every backend visible to this account.
    ///
    /// Entries are returned unparsed so one malformed backend does not hide
    /// the others.
    pub async fn list_backends(&self) -> IbmqResult<Vec<Value>> {
        let url = if self.credentials.unique_id().is_complete() {
            format!("{}/devices/v/1", self.job_root())
        } else {
            format!("{}/Backends/v/1", self.credentials.url())
        };

        let response = self.get(&url).await?;
        check(response).await?.json().await.map_err(IbmqError::from)
    }

    /// Queue status of a backend.
    pub async fn backend_status(&self, name: &str) -> IbmqResult<BackendStatus> {
        let url = format!("{}/Backends/{name}/queue/status", self.credentials.url());
        let response = self.get(&url).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmqError::BackendNotFound(name.to_string()));
        }

        let queue: QueueStatusResponse = check(response).await?.json().await?;
        Ok(BackendStatus {
            backend_name: name.to_string(),
            backend_version: queue.backend_version.unwrap_or_default(),
            operational: queue.state,
            pending_jobs: queue.length_queue,
            status_msg: queue.status,
        })
    }

    /// Calibration properties; `None` when the backend publishes none.
    pub async fn backend_properties(&self, name: &str) -> IbmqResult<Option<BackendProperties>> {
        let url = format!("{}/Backends/{name}/properties", self.credentials.url());
        tracing::debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .query(&[("version", "1")])
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmqError::BackendNotFound(name.to_string()));
        }

        let value: Value = check(response).await?.json().await?;
        if is_empty_document(&value) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Pulse defaults; `None` when the backend publishes none.
    pub async fn backend_defaults(&self, name: &str) -> IbmqResult<Option<Value>> {
        let url = format!("{}/Backends/{name}/defaults", self.credentials.url());
        let response = self.get(&url).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmqError::BackendNotFound(name.to_string()));
        }

        let value: Value = check(response).await?.json().await?;
        Ok((!is_empty_document(&value)).then_some(value))
    }

    /// Submit a Qobj to a backend.
    pub async fn submit_job(&self, backend: &str, qobj: &Qobj) -> IbmqResult<JobInfo> {
        let url = format!("{}/Jobs", self.job_root());
        let body = SubmitRequest {
            qobj,
            backend: BackendRef {
                name: backend.to_string(),
            },
        };

        tracing::debug!("POST {url} (backend {backend}, qobj {})", qobj.qobj_id);
        let response = self.client.post(&url).json(&body).send().await?;
        check(response).await?.json().await.map_err(IbmqError::from)
    }

    /// Full job record, including the result once completed.
    pub async fn get_job(&self, job_id: &str) -> IbmqResult<JobInfo> {
        let url = format!("{}/Jobs/{job_id}", self.job_root());
        let response = self.get(&url).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmqError::JobNotFound(job_id.to_string()));
        }
        check(response).await?.json().await.map_err(IbmqError::from)
    }

    /// Lightweight job status.
    pub async fn get_job_status(&self, job_id: &str) -> IbmqResult<JobInfo> {
        let url = format!("{}/Jobs/{job_id}/status", self.job_root());
        let response = self.get(&url).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmqError::JobNotFound(job_id.to_string()));
        }
        check(response).await?.json().await.map_err(IbmqError::from)
    }

    /// Cancel a job.
    pub async fn cancel_job(&self, job_id: &str) -> IbmqResult<()> {
        let url = format!("{}/Jobs/{job_id}/cancel", self.job_root());
        tracing::debug!("POST {url}");
        let response = self.client.post(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IbmqError::JobNotFound(job_id.to_string()));
        }
        check(response).await?;
        Ok(())
    }

    async fn get(&self, url: &str) -> IbmqResult<Response> {
        tracing::debug!("GET {url}");
        Ok(self.client.get(url).send().await?)
    }
}

/// Pass successful responses through; turn the rest into `ApiError`.
async fn check(response: Response) -> IbmqResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "no body".to_string());

    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) => Err(IbmqError::ApiError {
            code: parsed.error.code,
            message: parsed.error.message,
        }),
        Err(_) => Err(IbmqError::ApiError {
            code: Some(status.as_u16().to_string()),
            message: format!("{status}: {body}"),
        }),
    }
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("{status}"))
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

// ============================================================================
// Request types
// ============================================================================

#[derive(Debug, serde::Serialize)]
struct SubmitRequest<'a> {
    #[serde(rename = "qObject")]
    qobj: &'a Qobj,
    backend: BackendRef,
}

/// Reference to a backend by name.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct BackendRef {
    pub name: String,
}

// ============================================================================
// Response types
// ============================================================================

/// API error response (`{"error": {...}}`).
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

/// Body of an API error.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Backend queue status (`/Backends/{name}/queue/status`).
#[derive(Debug, Deserialize)]
struct QueueStatusResponse {
    state: bool,
    #[serde(default)]
    status: String,
    #[serde(default, rename = "lengthQueue")]
    length_queue: u64,
    #[serde(default)]
    backend_version: Option<String>,
}

/// Job record as returned by the job routes.
#[derive(Debug, Clone, Deserialize)]
pub struct JobInfo {
    /// Job id.
    pub id: String,
    /// API status (`RUNNING`, `COMPLETED`, `ERROR_RUNNING_JOB`, ...).
    pub status: String,
    #[serde(default, rename = "creationDate")]
    pub creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub backend: Option<BackendRef>,
    /// Queue details while the job waits.
    #[serde(default, rename = "infoQueue")]
    pub info_queue: Option<InfoQueue>,
    /// Result, present once the job completed.
    #[serde(default, rename = "qObjectResult")]
    pub result: Option<JobResult>,
    /// Failure details.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Queue details of a waiting job.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoQueue {
    pub status: String,
}
