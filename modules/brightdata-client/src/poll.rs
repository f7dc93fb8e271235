use std::time::Duration;

use serde_json::Value;

use crate::error::BrightDataError;
use crate::types::SnapshotRecord;

/// Rule deciding whether a polled body is finished data rather than an
/// in-progress marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// Body is a non-empty array whose first element carries `key`.
    FirstRecordHasKey(String),
    /// Body is not an object whose `status` is `"running"`.
    StatusNotRunning,
}

impl Readiness {
    pub fn first_record_has(key: impl Into<String>) -> Self {
        Readiness::FirstRecordHasKey(key.into())
    }

    pub fn is_ready(&self, body: &Value) -> bool {
        match self {
            Readiness::FirstRecordHasKey(key) => body
                .as_array()
                .and_then(|items| items.first())
                .and_then(Value::as_object)
                .is_some_and(|first| first.contains_key(key)),
            Readiness::StatusNotRunning => match body {
                Value::Object(map) => map.get("status").and_then(Value::as_str) != Some("running"),
                _ => true,
            },
        }
    }
}

/// Retry budget for snapshot polling.
///
/// The default growth factor of `1.0` gives a fixed interval. A larger factor
/// grows the delay geometrically, capped at `max_interval`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
    pub backoff_factor: f64,
    pub max_interval: Duration,
}

impl PollPolicy {
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            backoff_factor: 1.0,
            max_interval: interval,
        }
    }

    /// Singleton profile lookups: 20 attempts, 10 seconds apart.
    pub fn profile() -> Self {
        Self::fixed(20, Duration::from_secs(10))
    }

    /// Post and channel discovery: 20 attempts, 60 seconds apart.
    pub fn posts() -> Self {
        Self::fixed(20, Duration::from_secs(60))
    }

    /// Single-post lookups that the provider is slow to resolve.
    pub fn long_posts() -> Self {
        Self::fixed(30, Duration::from_secs(60))
    }

    pub fn with_backoff(mut self, factor: f64, max_interval: Duration) -> Self {
        self.backoff_factor = factor.max(1.0);
        self.max_interval = max_interval.max(self.interval);
        self
    }

    /// Delay to wait after the given 1-based attempt before the next one.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if self.backoff_factor <= 1.0 {
            return self.interval;
        }
        let exponent = attempt.saturating_sub(1).min(64) as i32;
        let secs = self.interval.as_secs_f64() * self.backoff_factor.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_interval.as_secs_f64()))
    }
}

/// Terminal state of a poll loop.
#[derive(Debug)]
pub enum PollOutcome {
    Ready(Vec<SnapshotRecord>),
    Exhausted { attempts: u32 },
    TransportFailure { attempts: u32, error: BrightDataError },
}

impl PollOutcome {
    /// Collapse to records, or `None` when nothing ready was received.
    pub fn into_records(self) -> Option<Vec<SnapshotRecord>> {
        match self {
            PollOutcome::Ready(records) => Some(records),
            PollOutcome::Exhausted { .. } | PollOutcome::TransportFailure { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PollOutcome::Ready(_))
    }
}
