pub mod datasets;
pub mod decode;
pub mod error;
pub mod poll;
pub mod types;

pub use datasets::{Dataset, DatasetSpec};
pub use error::{BrightDataError, Result};
pub use poll::{PollOutcome, PollPolicy, Readiness};
pub use types::{into_records, Discovery, JobHandle, JobRequest, SnapshotRecord, TriggerQuery};

use std::time::Duration;

use serde_json::Value;
use types::TriggerResponse;

const BASE_URL: &str = "https://api.brightdata.com/datasets/v3";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct BrightDataClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl BrightDataClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            base_url: BASE_URL.to_string(),
            token: token.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Submit a scrape job. Returns the snapshot handle to poll.
    pub async fn trigger(&self, query: &TriggerQuery, request: &JobRequest) -> Result<JobHandle> {
        let url = format!("{}/trigger", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .query(&query.pairs())
            .json(&[request])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BrightDataError::Trigger {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let parsed: TriggerResponse = serde_json::from_value(decode::decode_body(&body)?)
            .map_err(|_| BrightDataError::MissingSnapshotId(body.clone()))?;
        match parsed.snapshot_id {
            Some(snapshot_id) if !snapshot_id.is_empty() => Ok(JobHandle { snapshot_id }),
            _ => Err(BrightDataError::MissingSnapshotId(body)),
        }
    }

    /// Fetch the snapshot body once, whatever state it is in.
    pub async fn fetch_snapshot(&self, handle: &JobHandle, with_format: bool) -> Result<Value> {
        let url = format!("{}/snapshot/{}", self.base_url, handle.snapshot_id);
        let mut req = self.client.get(&url).bearer_auth(&self.token);
        if with_format {
            req = req.query(&[("format", "json")]);
        }
        let resp = req.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BrightDataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        decode::decode_body(&body)
    }

    /// Poll a snapshot until `readiness` accepts a body or the budget runs out.
    pub async fn poll(
        &self,
        handle: &JobHandle,
        readiness: &Readiness,
        policy: &PollPolicy,
        with_format: bool,
    ) -> PollOutcome {
        self.poll_with(handle, |body| readiness.is_ready(body), policy, with_format)
            .await
    }

    /// Poll with an arbitrary readiness predicate. One request per attempt;
    /// the policy delay is only applied between attempts.
    pub async fn poll_with<F>(
        &self,
        handle: &JobHandle,
        is_ready: F,
        policy: &PollPolicy,
        with_format: bool,
    ) -> PollOutcome
    where
        F: Fn(&Value) -> bool,
    {
        let snapshot_id = handle.snapshot_id.as_str();
        for attempt in 1..=policy.max_attempts {
            match self.fetch_snapshot(handle, with_format).await {
                Ok(body) if is_ready(&body) => {
                    tracing::info!(snapshot_id, attempt, "Snapshot data is ready");
                    return PollOutcome::Ready(into_records(body));
                }
                Ok(_) => {
                    tracing::debug!(snapshot_id, attempt, "Snapshot not ready yet");
                }
                Err(error) => {
                    tracing::warn!(snapshot_id, attempt, %error, "Error fetching snapshot data");
                    return PollOutcome::TransportFailure {
                        attempts: attempt,
                        error,
                    };
                }
            }

            if attempt < policy.max_attempts {
                let delay = policy.delay_after(attempt);
                tracing::info!(
                    snapshot_id,
                    attempt,
                    retry_in_secs = delay.as_secs_f64(),
                    "Snapshot is not ready yet, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }

        PollOutcome::Exhausted {
            attempts: policy.max_attempts,
        }
    }

    /// Run a job end-to-end: trigger, poll, collect records.
    /// `Ok(None)` means the snapshot never became ready (or polling broke off).
    pub async fn collect(
        &self,
        spec: &DatasetSpec,
        request: &JobRequest,
    ) -> Result<Option<Vec<SnapshotRecord>>> {
        tracing::info!(
            dataset_id = spec.dataset_id,
            url = %request.target_url,
            "Triggering snapshot"
        );

        let handle = self.trigger(&spec.trigger_query(), request).await?;
        tracing::info!(snapshot_id = %handle, "Snapshot trigger successful, polling for data");

        let outcome = self
            .poll(&handle, &spec.readiness, &spec.poll, spec.snapshot_format)
            .await;
        match &outcome {
            PollOutcome::Ready(records) => {
                tracing::info!(snapshot_id = %handle, count = records.len(), "Fetched snapshot records");
            }
            PollOutcome::Exhausted { attempts } => {
                tracing::warn!(snapshot_id = %handle, attempts, "Snapshot never became ready");
            }
            PollOutcome::TransportFailure { attempts, error } => {
                tracing::warn!(snapshot_id = %handle, attempts, %error, "Polling aborted");
            }
        }

        Ok(outcome.into_records())
    }
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}
