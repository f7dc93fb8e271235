// Trigger -> poll -> write, plus the chained multi-job commands.

use std::time::Duration;

use anyhow::{Context, Result};
use brightdata_client::{BrightDataClient, PollPolicy, SnapshotRecord};
use serde_json::Value;
use tracing::{info, warn};

use crate::jobs::Job;
use crate::sink::{RecordSink, Written};

/// How a job ended. `NotReady` is not an error: nothing was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Written { records: usize, outputs: Vec<Written> },
    NotReady,
}

/// Optional CLI overrides of a dataset's poll budget.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PollOverride {
    pub max_attempts: Option<u32>,
    pub interval: Option<Duration>,
    pub backoff_factor: Option<f64>,
    pub max_interval: Option<Duration>,
}

const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(300);

impl PollOverride {
    pub fn apply(&self, mut policy: PollPolicy) -> PollPolicy {
        if let Some(max_attempts) = self.max_attempts {
            policy.max_attempts = max_attempts.max(1);
        }
        if let Some(interval) = self.interval {
            policy.interval = interval;
            policy.max_interval = policy.max_interval.max(interval);
        }
        if let Some(factor) = self.backoff_factor {
            let cap = self.max_interval.unwrap_or(DEFAULT_MAX_INTERVAL);
            policy = policy.with_backoff(factor, cap);
        }
        policy
    }
}

/// YouTube channel id, taken from a profile snapshot's `id` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn from_profile(record: &SnapshotRecord) -> Option<Self> {
        match record.get("id")? {
            Value::String(id) if !id.trim().is_empty() => Some(ChannelId(id.trim().to_string())),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct Runner {
    client: BrightDataClient,
    sinks: Vec<Box<dyn RecordSink>>,
    poll: PollOverride,
}

impl Runner {
    pub fn new(client: BrightDataClient, sinks: Vec<Box<dyn RecordSink>>) -> Self {
        Self {
            client,
            sinks,
            poll: PollOverride::default(),
        }
    }

    pub fn with_poll_override(mut self, poll: PollOverride) -> Self {
        self.poll = poll;
        self
    }

    /// Trigger and poll. `Ok(None)` when the snapshot never became ready.
    pub async fn fetch(&self, job: &Job) -> Result<Option<Vec<SnapshotRecord>>> {
        let mut spec = job.dataset.spec();
        spec.poll = self.poll.apply(spec.poll);

        self.client
            .collect(&spec, &job.request)
            .await
            .with_context(|| format!("{} job for {} failed", job.dataset, job.request.target_url))
    }

    /// Hand records to every sink, in order.
    pub async fn write(&self, job: &Job, records: &[SnapshotRecord]) -> Result<Vec<Written>> {
        let mut outputs = Vec::new();
        for sink in &self.sinks {
            let written = sink
                .write(records, &job.locator)
                .await
                .with_context(|| format!("{} sink failed for {}", sink.name(), job.locator))?;
            outputs.extend(written);
        }
        Ok(outputs)
    }

    pub async fn run(&self, job: &Job) -> Result<JobOutcome> {
        Ok(self.run_collecting(job).await?.0)
    }

    /// Like `run`, also returning the records for chained jobs.
    async fn run_collecting(&self, job: &Job) -> Result<(JobOutcome, Option<Vec<SnapshotRecord>>)> {
        let Some(records) = self.fetch(job).await? else {
            warn!(dataset = %job.dataset, locator = %job.locator, "Failed to fetch snapshot data");
            return Ok((JobOutcome::NotReady, None));
        };

        let outputs = self.write(job, &records).await?;
        info!(
            dataset = %job.dataset,
            records = records.len(),
            outputs = outputs.len(),
            "Snapshot data processed"
        );
        Ok((
            JobOutcome::Written {
                records: records.len(),
                outputs,
            },
            Some(records),
        ))
    }

    /// Instagram profile, then its posts. The two jobs do not depend on each other.
    pub async fn instagram_all(&self, handle: &str, num_of_posts: u32) -> Result<Vec<JobOutcome>> {
        let profile = self.run(&Job::instagram_profile(handle)).await?;
        let posts = self.run(&Job::instagram_posts(handle, num_of_posts)).await?;
        Ok(vec![profile, posts])
    }

    /// YouTube profile lookup, then the channel's videos using the profile's channel id.
    pub async fn youtube_all(
        &self,
        handle: &str,
        num_of_posts: u32,
        from_date: Option<&str>,
        until_date: Option<&str>,
    ) -> Result<Vec<JobOutcome>> {
        let (profile, records) = self.run_collecting(&Job::youtube_profile(handle)).await?;
        let Some(records) = records else {
            warn!(handle, "Profile not available, skipping channel fetch");
            return Ok(vec![profile]);
        };

        let channel_id = records
            .first()
            .and_then(ChannelId::from_profile)
            .with_context(|| format!("channel id not found in YouTube profile of {handle}"))?;
        info!(handle, %channel_id, "Resolved YouTube channel id");

        let channel = self
            .run(&Job::youtube_channel(
                channel_id.as_str(),
                num_of_posts,
                from_date,
                until_date,
                Some(handle),
            ))
            .await?;
        Ok(vec![profile, channel])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_id_from_profile_record() {
        let record = brightdata_client::into_records(json!({ "id": " UC_abc ", "handle": "@x" }));
        assert_eq!(
            ChannelId::from_profile(&record[0]).map(|c| c.to_string()),
            Some("UC_abc".to_string())
        );

        let record = brightdata_client::into_records(json!({ "id": 42 }));
        assert_eq!(ChannelId::from_profile(&record[0]), None);
    }

    #[test]
    fn poll_override_replaces_only_given_fields() {
        let base = PollPolicy::posts();
        assert_eq!(PollOverride::default().apply(base.clone()), base);

        let policy = PollOverride {
            max_attempts: Some(3),
            ..Default::default()
        }
        .apply(base);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.interval, Duration::from_secs(60));

        let policy = PollOverride {
            interval: Some(Duration::from_millis(5)),
            ..Default::default()
        }
        .apply(PollPolicy::profile());
        assert_eq!(policy.interval, Duration::from_millis(5));
        assert_eq!(policy.max_attempts, 20);
        assert_eq!(policy.backoff_factor, 1.0);
    }

    #[test]
    fn poll_override_enables_capped_backoff() {
        let policy = PollOverride {
            backoff_factor: Some(2.0),
            max_interval: Some(Duration::from_secs(30)),
            ..Default::default()
        }
        .apply(PollPolicy::profile());
        assert_eq!(policy.delay_after(1), Duration::from_secs(10));
        assert_eq!(policy.delay_after(2), Duration::from_secs(20));
        assert_eq!(policy.delay_after(3), Duration::from_secs(30));

        let policy = PollOverride {
            backoff_factor: Some(2.0),
            ..Default::default()
        }
        .apply(PollPolicy::posts());
        assert_eq!(policy.delay_after(10), Duration::from_secs(300));
    }
}
