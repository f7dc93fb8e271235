use std::sync::Arc;

use anyhow::{Context, Result};
use brightdata_client::BrightDataClient;
use clap::Parser;
use drive_client::{DriveClient, ServiceAccountTokens};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use social_snapshot::cli::{self, Cli};
use social_snapshot::sink::{drive::DriveSink, file::FileSink, RecordSink};
use social_snapshot::{AppConfig, JobOutcome, Runner};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("social_snapshot=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    let mut client = BrightDataClient::new(config.brightdata_api_key.clone());
    if let Some(base_url) = &config.brightdata_base_url {
        client = client.with_base_url(base_url.clone());
    }

    let output_dir = cli.output_dir.clone().unwrap_or(config.output_dir.clone());
    let (json, csv) = cli.format.flags();
    let file_sink = FileSink::new(output_dir)
        .with_formats(json, csv)
        .with_empty_policy(cli.empty);
    let mut sinks: Vec<Box<dyn RecordSink>> = vec![Box::new(file_sink)];

    if cli.upload {
        let google = config
            .google
            .as_ref()
            .context("--upload needs GOOGLE_APPLICATION_CREDENTIALS or GOOGLE_CLIENT_EMAIL/GOOGLE_PRIVATE_KEY")?;
        let tokens = ServiceAccountTokens::new(google.service_account_key()?)?;
        let drive = DriveSink::new(DriveClient::new(Arc::new(tokens)))
            .with_parent_folder(google.parent_folder_id.clone())
            .with_share_with(cli.share_with.clone().or(google.share_with.clone()))
            .as_spreadsheet(cli.as_sheet);
        sinks.push(Box::new(drive));
    }

    let runner = Runner::new(client, sinks).with_poll_override(cli.poll_override());
    let outcomes = cli::dispatch(&runner, cli.command).await?;

    for outcome in outcomes {
        match outcome {
            JobOutcome::Written { records, outputs } => {
                for output in outputs {
                    info!(sink = output.sink, location = %output.location, records, "Output written");
                }
            }
            JobOutcome::NotReady => warn!("Failed to fetch snapshot data"),
        }
    }

    Ok(())
}
