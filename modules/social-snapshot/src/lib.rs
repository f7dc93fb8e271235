pub mod cli;
pub mod config;
pub mod jobs;
pub mod pipeline;
pub mod sink;

pub use config::AppConfig;
pub use jobs::Job;
pub use pipeline::{ChannelId, JobOutcome, PollOverride, Runner};
pub use sink::{Locator, RecordSink, WriteError, Written};
