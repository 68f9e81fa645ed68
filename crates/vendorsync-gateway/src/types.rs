/*
[INPUT]:  JSON payloads exchanged with the marketplace bridge
[OUTPUT]: Typed request/response shapes for gateway operations
[POS]:    Type layer - wire formats
[UPDATE]: When the bridge status or dispatch payloads change
*/

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Progress of one remote action within a long-running job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub action: String,
    pub current: u64,
    pub total: u64,
}

/// Snapshot of the long-running job reported by the bridge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    pub running: bool,
    #[serde(default)]
    pub status: Vec<StatusEntry>,
}

/// One dispatch call: an opaque action id plus request parameters.
///
/// Parameters are kept ordered so request bodies are deterministic; the
/// `action` field always wins over a parameter of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub action: String,
    pub params: BTreeMap<String, Value>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn merge<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.params.extend(params);
        self
    }

    /// Flatten into the JSON body sent to the bridge:
    /// `{"action": ..., <param>: ..., ...}`
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        for (key, value) in &self.params {
            body.insert(key.clone(), value.clone());
        }
        body.insert("action".to_string(), Value::String(self.action.clone()));
        Value::Object(body)
    }
}
