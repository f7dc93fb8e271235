use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One scraped entity (post, profile, channel). Field order follows the provider body.
pub type SnapshotRecord = Map<String, Value>;

/// Input for a single trigger call. Serializes to `{"url": ..., ...params}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobRequest {
    #[serde(rename = "url")]
    pub target_url: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl JobRequest {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// How the provider should discover entities from the target URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discovery {
    pub kind: &'static str,
    pub by: &'static str,
}

impl Discovery {
    pub const fn new_by(by: &'static str) -> Self {
        Self {
            kind: "discover_new",
            by,
        }
    }
}

/// Query string of the trigger endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerQuery {
    pub dataset_id: String,
    pub discovery: Option<Discovery>,
    pub uncompressed_webhook: bool,
}

impl TriggerQuery {
    pub fn new(dataset_id: impl Into<String>) -> Self {
        Self {
            dataset_id: dataset_id.into(),
            discovery: None,
            uncompressed_webhook: false,
        }
    }

    pub fn with_discovery(mut self, discovery: Discovery) -> Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn with_uncompressed_webhook(mut self, enabled: bool) -> Self {
        self.uncompressed_webhook = enabled;
        self
    }

    /// Trigger results are always requested as JSON.
    pub(crate) fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("dataset_id", self.dataset_id.clone())];
        if let Some(discovery) = self.discovery {
            pairs.push(("type", discovery.kind.to_string()));
            pairs.push(("discover_by", discovery.by.to_string()));
        }
        pairs.push(("format", "json".to_string()));
        if self.uncompressed_webhook {
            pairs.push(("uncompressed_webhook", "true".to_string()));
        }
        pairs
    }
}

/// Poll key returned once by a successful trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobHandle {
    pub snapshot_id: String,
}

impl std::fmt::Display for JobHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.snapshot_id)
    }
}

/// Body of a trigger response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TriggerResponse {
    pub snapshot_id: Option<String>,
}

/// Turn a ready payload into records: arrays yield one record per element,
/// a bare object is a single record.
pub fn into_records(payload: Value) -> Vec<SnapshotRecord> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => map,
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            })
            .collect(),
        Value::Object(map) => vec![map],
        Value::Null => Vec::new(),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            vec![map]
        }
    }
}
