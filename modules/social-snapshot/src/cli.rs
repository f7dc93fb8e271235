use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::jobs::Job;
use crate::pipeline::{JobOutcome, PollOverride, Runner};
use crate::sink::EmptyPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "social-snapshot",
    version,
    about = "Fetch social media snapshots from Bright Data"
)]
pub struct Cli {
    /// Local output root (overrides SNAPSHOT_OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Which local files to write
    #[arg(long, value_enum, default_value_t = OutputFormat::Both, global = true)]
    pub format: OutputFormat,

    /// What to write locally when a job returns no records
    #[arg(long, value_enum, default_value_t = EmptyPolicy::Skip, global = true)]
    pub empty: EmptyPolicy,

    /// Also upload the CSV to Google Drive
    #[arg(long, global = true)]
    pub upload: bool,

    /// Share uploaded files with this address (overrides GOOGLE_DRIVE_SHARE_WITH)
    #[arg(long, global = true)]
    pub share_with: Option<String>,

    /// Convert uploads to Google Sheets
    #[arg(long, global = true)]
    pub as_sheet: bool,

    /// Override the dataset's poll attempt budget
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Override the dataset's poll interval, in seconds
    #[arg(long, global = true)]
    pub poll_interval: Option<u64>,

    /// Grow the poll interval by this factor after every attempt
    #[arg(long, global = true)]
    pub backoff_factor: Option<f64>,

    /// Upper bound for the grown poll interval, in seconds
    #[arg(long, global = true, requires = "backoff_factor")]
    pub max_poll_interval: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn poll_override(&self) -> PollOverride {
        PollOverride {
            max_attempts: self.max_attempts,
            interval: self.poll_interval.map(Duration::from_secs),
            backoff_factor: self.backoff_factor,
            max_interval: self.max_poll_interval.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
    Both,
}

impl OutputFormat {
    /// `(json, csv)`
    pub fn flags(self) -> (bool, bool) {
        match self {
            OutputFormat::Json => (true, false),
            OutputFormat::Csv => (false, true),
            OutputFormat::Both => (true, true),
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Instagram profiles and posts
    Instagram {
        #[command(subcommand)]
        command: InstagramCommand,
    },
    /// LinkedIn profiles
    Linkedin {
        #[command(subcommand)]
        command: LinkedinCommand,
    },
    /// X (Twitter) profiles and posts
    X {
        #[command(subcommand)]
        command: XCommand,
    },
    /// YouTube profiles and channel videos
    Youtube {
        #[command(subcommand)]
        command: YoutubeCommand,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum InstagramCommand {
    Profile {
        handle: String,
    },
    Posts {
        handle: String,
        num_of_posts: u32,
    },
    /// Profile, then posts
    All {
        handle: String,
        num_of_posts: u32,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LinkedinCommand {
    Profile { handle: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum XCommand {
    Profile {
        handle: String,
    },
    /// A single post, by status id or URL
    Post {
        post: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum YoutubeCommand {
    Profile {
        handle: String,
    },
    Channel {
        channel_id: String,
        num_of_posts: u32,
        /// Earliest upload date, as the provider expects it (MM-DD-YYYY)
        from_date: Option<String>,
        until_date: Option<String>,
    },
    /// Profile, then the videos of the channel it resolves to
    All {
        handle: String,
        num_of_posts: u32,
        from_date: Option<String>,
        until_date: Option<String>,
    },
}

/// Run one CLI command to completion.
pub async fn dispatch(runner: &Runner, command: Command) -> Result<Vec<JobOutcome>> {
    info!(?command, "Running command");
    match command {
        Command::Instagram { command } => match command {
            InstagramCommand::Profile { handle } => {
                Ok(vec![runner.run(&Job::instagram_profile(&handle)).await?])
            }
            InstagramCommand::Posts {
                handle,
                num_of_posts,
            } => Ok(vec![
                runner
                    .run(&Job::instagram_posts(&handle, num_of_posts))
                    .await?,
            ]),
            InstagramCommand::All {
                handle,
                num_of_posts,
            } => runner.instagram_all(&handle, num_of_posts).await,
        },
        Command::Linkedin {
            command: LinkedinCommand::Profile { handle },
        } => Ok(vec![runner.run(&Job::linkedin_profile(&handle)).await?]),
        Command::X { command } => match command {
            XCommand::Profile { handle } => Ok(vec![runner.run(&Job::x_profile(&handle)).await?]),
            XCommand::Post { post } => Ok(vec![runner.run(&Job::x_post(&post)).await?]),
        },
        Command::Youtube { command } => match command {
            YoutubeCommand::Profile { handle } => {
                Ok(vec![runner.run(&Job::youtube_profile(&handle)).await?])
            }
            YoutubeCommand::Channel {
                channel_id,
                num_of_posts,
                from_date,
                until_date,
            } => Ok(vec![
                runner
                    .run(&Job::youtube_channel(
                        &channel_id,
                        num_of_posts,
                        from_date.as_deref(),
                        until_date.as_deref(),
                        None,
                    ))
                    .await?,
            ]),
            YoutubeCommand::All {
                handle,
                num_of_posts,
                from_date,
                until_date,
            } => {
                runner
                    .youtube_all(
                        &handle,
                        num_of_posts,
                        from_date.as_deref(),
                        until_date.as_deref(),
                    )
                    .await
            }
        },
    }
}
