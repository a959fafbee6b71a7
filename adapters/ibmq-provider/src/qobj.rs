//! Qobj envelope and job results.
//!
//! Only the envelope is modelled: ids, configs, and the free-form headers
//! that must survive a round trip through the service. Experiment
//! instructions are opaque JSON, produced by whatever compiled the circuit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Qobj schema version sent with new payloads.
pub const QOBJ_SCHEMA_VERSION: &str = "1.0.0";

/// A job payload: one or more compiled experiments plus headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qobj {
    /// Payload id, echoed back in the result.
    pub qobj_id: String,
    /// Payload type (`QASM` or `PULSE`).
    #[serde(rename = "type", default = "default_qobj_type")]
    pub kind: String,
    /// Schema version.
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Run configuration (`shots`, `memory_slots`, ...).
    #[serde(default)]
    pub config: Map<String, Value>,
    /// User header, copied verbatim into the result header.
    #[serde(default)]
    pub header: Map<String, Value>,
    /// Experiments.
    pub experiments: Vec<QobjExperiment>,
}

/// One compiled experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QobjExperiment {
    /// Experiment header, copied verbatim into the experiment result.
    #[serde(default)]
    pub header: Map<String, Value>,
    /// Per-experiment configuration.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
    /// Compiled instructions.
    #[serde(default)]
    pub instructions: Vec<Value>,
}

fn default_qobj_type() -> String {
    "QASM".to_string()
}

fn default_schema_version() -> String {
    QOBJ_SCHEMA_VERSION.to_string()
}

impl Qobj {
    /// Create a QASM payload with a fresh id.
    pub fn new(experiments: Vec<QobjExperiment>) -> Self {
        Self {
            qobj_id: uuid::Uuid::new_v4().to_string(),
            kind: default_qobj_type(),
            schema_version: default_schema_version(),
            config: Map::new(),
            header: Map::new(),
            experiments,
        }
    }

    /// Replace the payload header.
    pub fn with_header(mut self, header: Map<String, Value>) -> Self {
        self.header = header;
        self
    }

    /// Set the number of shots.
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.config.insert("shots".into(), Value::from(shots));
        self
    }

    /// Number of shots, if configured.
    pub fn shots(&self) -> Option<u64> {
        self.config.get("shots").and_then(Value::as_u64)
    }
}

impl QobjExperiment {
    /// Create an experiment from compiled instructions.
    pub fn new(instructions: Vec<Value>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    /// Set one header field.
    pub fn with_header_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }
}

/// Result of a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub backend_name: String,
    #[serde(default)]
    pub backend_version: String,
    pub qobj_id: String,
    #[serde(default)]
    pub job_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// The submitted payload header.
    #[serde(default)]
    pub header: Map<String, Value>,
    pub results: Vec<ExperimentResult>,
}

/// Result of one experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    #[serde(default)]
    pub shots: u64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub data: ExperimentData,
    /// The submitted experiment header.
    #[serde(default)]
    pub header: Map<String, Value>,
}

/// Measurement data of one experiment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentData {
    /// Hex outcome → count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<BTreeMap<String, u64>>,
    /// Anything else (`memory`, `snapshots`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobResult {
    /// Counts of experiment `index`, with outcomes rendered as bitstrings
    /// `memory_slots` wide (taken from the experiment header when present).
    pub fn counts(&self, index: usize) -> Option<BTreeMap<String, u64>> {
        let experiment = self.results.get(index)?;
        let raw = experiment.data.counts.as_ref()?;
        let width = experiment
            .header
            .get("memory_slots")
            .and_then(Value::as_u64)
            .map_or(0, |w| w as usize);

        let mut counts = BTreeMap::new();
        for (outcome, &count) in raw {
            *counts.entry(hex_to_bitstring(outcome, width)).or_insert(0) += count;
        }
        Some(counts)
    }
}

/// Render a hex outcome (`0x5`) as a bitstring, zero-padded to `width`.
///
/// Outcomes that are not hex are returned unchanged.
fn hex_to_bitstring(outcome: &str, width: usize) -> String {
    let hex = outcome.strip_prefix("0x").unwrap_or(outcome);
    match u64::from_str_radix(hex, 16) {
        Ok(value) => format!("{value:0>width$b}"),
        Err(_) => outcome.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_new_qobj_has_unique_id() {
        let a = Qobj::new(vec![]);
        let b = Qobj::new(vec![]);
        assert_ne!(a.qobj_id, b.qobj_id);
        assert_eq!(a.kind, "QASM");
        assert_eq!(a.schema_version, QOBJ_SCHEMA_VERSION);
    }

    #[test]
    fn test_qobj_serializes_type_field() {
        let qobj = Qobj::new(vec![QobjExperiment::new(vec![json!({"name": "h", "qubits": [0]})])])
            .with_shots(1024);
        let value = serde_json::to_value(&qobj).unwrap();
        assert_eq!(value["type"], "QASM");
        assert_eq!(value["config"]["shots"], 1024);
        assert_eq!(value["experiments"][0]["instructions"][0]["name"], "h");
        assert!(value["experiments"][0].get("config").is_none());
        assert_eq!(qobj.shots(), Some(1024));
    }

    #[test]
    fn test_nested_header_preserved() {
        let header = json!({"x": 1, "y": [1, 2, 3], "z": {"a": 4}});
        let qobj = Qobj::new(vec![QobjExperiment::default().with_header_field("some_field", "extra info")])
            .with_header(header.as_object().unwrap().clone());

        let text = serde_json::to_string(&qobj).unwrap();
        let back: Qobj = serde_json::from_str(&text).unwrap();
        assert_eq!(Value::Object(back.header), header);
        assert_eq!(back.experiments[0].header["some_field"], "extra info");
    }

    #[test]
    fn test_job_result_deserialization() {
        let json = r#"{
            "backend_name": "ibmq_qasm_simulator",
            "backend_version": "0.1.547",
            "qobj_id": "q1",
            "job_id": "j1",
            "success": true,
            "status": "COMPLETED",
            "header": {"x": 1},
            "results": [{
                "shots": 1024,
                "success": true,
                "data": {"counts": {"0x0": 510, "0x1": 514}, "memory": ["0x0"]},
                "header": {"name": "circuit0", "memory_slots": 1, "some_field": "extra info"}
            }]
        }"#;
        let result: JobResult = serde_json::from_str(json).unwrap();
        assert!(result.success);
        assert_eq!(result.header["x"], 1);
        assert_eq!(result.results[0].header["some_field"], "extra info");
        assert!(result.results[0].data.extra.contains_key("memory"));

        let counts = result.counts(0).unwrap();
        assert_eq!(counts["0"], 510);
        assert_eq!(counts["1"], 514);
        assert!(result.counts(1).is_none());
    }

    #[test]
    fn test_hex_to_bitstring() {
        assert_eq!(hex_to_bitstring("0x0", 2), "00");
        assert_eq!(hex_to_bitstring("0x3", 2), "11");
        assert_eq!(hex_to_bitstring("0x5", 5), "00101");
        assert_eq!(hex_to_bitstring("0x5", 0), "101");
        assert_eq!(hex_to_bitstring("zz", 3), "zz");
    }
}
