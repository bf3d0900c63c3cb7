//! Alert grouper CLI
//!
//! Receives Alertmanager webhooks and files them as grouped Redmine tickets.

use alert_grouper::{GrouperConfig, GroupingEngine};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use redmine::time::parse_timestamp;
use redmine::RedmineClient;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "alert_grouper=info,redmine=info,tower_http=info";

/// Groups Alertmanager alerts into root/child Redmine tickets
#[derive(Parser)]
#[command(name = "alert-grouper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Alertmanager webhook server
    Serve {
        /// Address to bind to
        #[arg(long, env = "ALERT_GROUPER_ADDR", default_value = "0.0.0.0:8080")]
        addr: String,
    },
    /// Print the live ticket cluster for an alert name without changing anything
    Inspect {
        /// Alert name to look up
        #[arg(long)]
        alertname: String,

        /// Evaluate the window as of this time (ISO-8601, default: now)
        #[arg(long)]
        at: Option<String>,
    },
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

fn build_engine() -> Result<GroupingEngine<RedmineClient>> {
    let config = GrouperConfig::from_env().context("Invalid configuration")?;
    info!(
        redmine_url = %config.redmine.base_url,
        project = %config.redmine.project.as_query_value(),
        tracker_id = config.redmine.tracker_id,
        root_tracker_id = config.redmine.root_tracker_id,
        "Loaded configuration"
    );

    let client = RedmineClient::new(config.redmine).context("Failed to create Redmine client")?;
    Ok(GroupingEngine::new(client))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    // Configuration errors abort before any socket is bound
    let engine = build_engine()?;

    match cli.command {
        Commands::Serve { addr } => {
            alert_grouper::run_server(Arc::new(engine), &addr).await?;
        }
        Commands::Inspect { alertname, at } => {
            let at: DateTime<Utc> = match at.as_deref() {
                Some(value) => parse_timestamp(value)
                    .with_context(|| format!("Unrecognized timestamp: {value}"))?,
                None => Utc::now(),
            };

            let cluster = engine
                .classify(&alertname, at)
                .await
                .context("Failed to read tickets from Redmine")?;
            println!("{}", serde_json::to_string_pretty(&cluster)?);
        }
    }

    Ok(())
}
