//! In-process stand-in for the IBM Q Experience API.
//!
//! Serves just enough of the REST surface for the provider: login, backend
//! listings (global and per hub), queue status, properties, defaults, and a
//! job lifecycle that advances one step per status poll.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use ibmq_provider::{ClientConfig, Credentials};
use serde_json::{Value, json};

pub const VALID_TOKEN: &str = "valid-token";
pub const ACCESS_TOKEN: &str = "access-123";

pub const HUB: &str = "ibm-q-hub";
pub const GROUP: &str = "research";
pub const PROJECT: &str = "main";

/// Backend whose status is non-operational and whose jobs fail.
pub const BROKEN_BACKEND: &str = "ibmq_broken";
/// Message the fake API attaches to failed jobs.
pub const JOB_FAILURE_MESSAGE: &str = "qubit calibration out of range";

const HUB_PREFIX: &str = "/api/Network/{hub}/Groups/{group}/Projects/{project}";

#[derive(Debug)]
struct FakeJob {
    backend: String,
    qobj: Value,
    polls: u32,
    cancelled: bool,
}

#[derive(Debug, Default)]
struct FakeState {
    jobs: HashMap<String, FakeJob>,
    next_job: u32,
}

type Shared = Arc<Mutex<FakeState>>;

/// A running fake API.
pub struct FakeApi {
    /// Base URL including the `/api` prefix.
    pub url: String,
}

impl FakeApi {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));

        let mut app = Router::new()
            .route("/api/users/loginWithToken", post(login))
            .route("/api/Backends/v/1", get(list_backends))
            .route(&format!("{HUB_PREFIX}/devices/v/1"), get(list_hub_backends))
            .route("/api/Backends/{name}/queue/status", get(queue_status))
            .route("/api/Backends/{name}/properties", get(properties))
            .route("/api/Backends/{name}/defaults", get(defaults));

        for prefix in ["/api", HUB_PREFIX] {
            app = app
                .route(&format!("{prefix}/Jobs"), post(submit_job))
                .route(&format!("{prefix}/Jobs/{{id}}"), get(get_job))
                .route(&format!("{prefix}/Jobs/{{id}}/status"), get(job_status))
                .route(&format!("{prefix}/Jobs/{{id}}/cancel"), post(cancel_job));
        }

        let app = app.with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}/api"),
        }
    }

    /// Credentials for the default (non-hub) account.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(VALID_TOKEN, &self.url)
    }

    /// Credentials routed to the fake hub/group/project.
    pub fn hub_credentials(&self) -> Credentials {
        self.credentials()
            .with_hub(HUB)
            .with_group(GROUP)
            .with_project(PROJECT)
    }
}

/// Fast polling so job tests finish quickly.
pub fn fast_config() -> ClientConfig {
    ClientConfig {
        poll_interval_ms: 10,
        job_timeout_secs: 5,
        ..ClientConfig::default()
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn device(name: &str, n_qubits: u32) -> Value {
    let coupling: Vec<[u32; 2]> = (1..n_qubits).map(|q| [q, q - 1]).collect();
    json!({
        "backend_name": name,
        "backend_version": "1.0.0",
        "n_qubits": n_qubits,
        "basis_gates": ["u1", "u2", "u3", "cx", "id"],
        "simulator": false,
        "local": false,
        "conditional": false,
        "open_pulse": false,
        "memory": true,
        "max_shots": 8192,
        "coupling_map": coupling,
        "description": format!("{n_qubits} qubit device"),
    })
}

fn simulator() -> Value {
    json!({
        "backend_name": "ibmq_qasm_simulator",
        "backend_version": "0.1.547",
        "n_qubits": 32,
        "basis_gates": ["u1", "u2", "u3", "cx", "id"],
        "simulator": true,
        "local": false,
        "conditional": true,
        "open_pulse": false,
        "memory": true,
        "max_shots": 8192,
    })
}

fn default_backends() -> Vec<Value> {
    vec![
        simulator(),
        device("ibmqx4", 5),
        device("ibmqx2", 5),
        device(BROKEN_BACKEND, 5),
        // Missing `n_qubits` and `simulator`; must be skipped.
        json!({"backend_name": "ibmq_malformed"}),
    ]
}

fn hub_backends() -> Vec<Value> {
    vec![simulator(), device("ibmq_20_tokyo", 20)]
}

fn is_known_backend(name: &str) -> bool {
    default_backends()
        .iter()
        .chain(hub_backends().iter())
        .any(|b| b["backend_name"] == name && b.get("n_qubits").is_some())
}

fn is_simulator(name: &str) -> bool {
    name == "ibmq_qasm_simulator"
}

fn api_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        axum::Json(json!({
            "error": {"status": status.as_u16(), "code": code, "message": message}
        })),
    )
        .into_response()
}

fn authorized(headers: &HeaderMap) -> Result<(), Response> {
    match headers.get("x-access-token").and_then(|v| v.to_str().ok()) {
        Some(ACCESS_TOKEN) => Ok(()),
        _ => Err(api_error(
            StatusCode::UNAUTHORIZED,
            "AUTHORIZATION_REQUIRED",
            "Authorization Required",
        )),
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn login(axum::Json(body): axum::Json<Value>) -> Response {
    if body["apiToken"] == VALID_TOKEN {
        axum::Json(json!({
            "id": ACCESS_TOKEN,
            "ttl": 1_209_600,
            "created": "2019-01-24T12:00:00.000Z",
            "userId": "user-1"
        }))
        .into_response()
    } else {
        api_error(StatusCode::UNAUTHORIZED, "LOGIN_FAILED", "login failed")
    }
}

async fn list_backends(headers: HeaderMap) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    axum::Json(default_backends()).into_response()
}

async fn list_hub_backends(
    headers: HeaderMap,
    Path(params): Path<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    if params.get("hub").map(String::as_str) != Some(HUB) {
        return api_error(StatusCode::NOT_FOUND, "HUB_NOT_FOUND", "unknown hub");
    }
    axum::Json(hub_backends()).into_response()
}

async fn queue_status(headers: HeaderMap, Path(name): Path<String>) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    if !is_known_backend(&name) {
        return api_error(StatusCode::NOT_FOUND, "DEVICE_NOT_FOUND", "no such backend");
    }
    let operational = name != BROKEN_BACKEND;
    axum::Json(json!({
        "state": operational,
        "status": if operational { "active" } else { "maintenance" },
        "lengthQueue": 2,
        "backend_version": "1.0.0"
    }))
    .into_response()
}

async fn properties(headers: HeaderMap, Path(name): Path<String>) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    if !is_known_backend(&name) {
        return api_error(StatusCode::NOT_FOUND, "DEVICE_NOT_FOUND", "no such backend");
    }
    if is_simulator(&name) {
        return axum::Json(json!({})).into_response();
    }
    axum::Json(json!({
        "backend_name": name,
        "backend_version": "1.0.0",
        "last_update_date": "2019-01-24T10:00:00Z",
        "qubits": [
            [{"name": "T1", "date": "2019-01-24T10:00:00Z", "unit": "µs", "value": 45.2}],
            [{"name": "T1", "date": "2019-01-24T10:00:00Z", "unit": "µs", "value": 51.7}]
        ],
        "gates": [
            {"gate": "cx", "qubits": [1, 0], "parameters": [
                {"name": "gate_error", "date": "2019-01-24T10:00:00Z", "unit": "", "value": 0.03}
            ]}
        ],
        "general": []
    }))
    .into_response()
}

async fn defaults(headers: HeaderMap, Path(name): Path<String>) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    if !is_known_backend(&name) {
        return api_error(StatusCode::NOT_FOUND, "DEVICE_NOT_FOUND", "no such backend");
    }
    axum::Json(json!({
        "qubit_freq_est": [5.25, 5.31],
        "meas_freq_est": [6.5, 6.6],
        "buffer": 10,
        "pulse_library": [],
        "cmd_def": []
    }))
    .into_response()
}

async fn submit_job(
    State(state): State<Shared>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let Some(backend) = body["backend"]["name"].as_str().map(str::to_string) else {
        return api_error(StatusCode::BAD_REQUEST, "MISSING_BACKEND", "backend is required");
    };
    if body.get("qObject").is_none() {
        return api_error(StatusCode::BAD_REQUEST, "QOBJ_MISSING", "qObject is required");
    }

    let mut state = state.lock().unwrap();
    state.next_job += 1;
    let id = format!("job-{}", state.next_job);
    state.jobs.insert(
        id.clone(),
        FakeJob {
            backend: backend.clone(),
            qobj: body["qObject"].clone(),
            polls: 0,
            cancelled: false,
        },
    );

    axum::Json(json!({
        "id": id,
        "status": "VALIDATING",
        "creationDate": "2019-01-24T12:00:00.000Z",
        "backend": {"name": backend}
    }))
    .into_response()
}

fn api_status(job: &FakeJob) -> (&'static str, Option<&'static str>) {
    if job.cancelled {
        return ("CANCELLED", None);
    }
    match job.polls {
        0 => ("RUNNING", Some("PENDING_IN_QUEUE")),
        1 => ("RUNNING", None),
        _ if job.backend == BROKEN_BACKEND => ("ERROR_RUNNING_JOB", None),
        _ => ("COMPLETED", None),
    }
}

async fn job_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(params): Path<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let id = params.get("id").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    let Some(job) = state.jobs.get_mut(&id) else {
        return api_error(StatusCode::NOT_FOUND, "JOB_NOT_FOUND", "no such job");
    };

    let (status, queue) = api_status(job);
    job.polls += 1;

    let mut body = json!({"id": id, "status": status});
    if let Some(queue) = queue {
        body["infoQueue"] = json!({"status": queue});
    }
    if status.starts_with("ERROR") {
        body["error"] = job_failure(status);
    }
    axum::Json(body).into_response()
}

fn job_failure(status: &str) -> Value {
    json!({"status": 500, "code": status, "message": JOB_FAILURE_MESSAGE})
}

fn job_result(id: &str, job: &FakeJob) -> Value {
    let shots = job.qobj["config"]["shots"].as_u64().unwrap_or(1024);
    let results: Vec<Value> = job.qobj["experiments"]
        .as_array()
        .map(|exps| {
            exps.iter()
                .map(|exp| {
                    let mut header = exp["header"].clone();
                    if header.is_null() {
                        header = json!({});
                    }
                    header["memory_slots"] = json!(2);
                    json!({
                        "shots": shots,
                        "success": true,
                        "status": "DONE",
                        "data": {"counts": {"0x0": shots / 2, "0x3": shots - shots / 2}},
                        "header": header
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    json!({
        "backend_name": job.backend,
        "backend_version": "1.0.0",
        "qobj_id": job.qobj["qobj_id"],
        "job_id": id,
        "success": true,
        "status": "COMPLETED",
        "header": job.qobj["header"],
        "results": results
    })
}

async fn get_job(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(params): Path<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let id = params.get("id").cloned().unwrap_or_default();
    let state = state.lock().unwrap();
    let Some(job) = state.jobs.get(&id) else {
        return api_error(StatusCode::NOT_FOUND, "JOB_NOT_FOUND", "no such job");
    };

    let (status, _) = api_status(job);
    let mut body = json!({
        "id": id,
        "status": status,
        "creationDate": "2019-01-24T12:00:00.000Z",
        "backend": {"name": job.backend}
    });
    if status == "COMPLETED" {
        body["qObjectResult"] = job_result(&id, job);
    } else if status.starts_with("ERROR") {
        body["error"] = job_failure(status);
    }
    axum::Json(body).into_response()
}

async fn cancel_job(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(params): Path<HashMap<String, String>>,
) -> Response {
    if let Err(resp) = authorized(&headers) {
        return resp;
    }
    let id = params.get("id").cloned().unwrap_or_default();
    let mut state = state.lock().unwrap();
    let Some(job) = state.jobs.get_mut(&id) else {
        return api_error(StatusCode::NOT_FOUND, "JOB_NOT_FOUND", "no such job");
    };
    job.cancelled = true;
    axum::Json(json!({"cancelled": true})).into_response()
}
