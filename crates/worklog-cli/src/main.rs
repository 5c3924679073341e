//! worklog - work-log assistant CLI

mod commands;
mod config;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use worklog_api::ApiClient;

/// worklog - submit work-log entries, generate reports, chat about them
#[derive(Parser, Debug)]
#[command(name = "worklog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backend base URL (overrides WORKLOG_BASE_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a work-log entry
    Record(commands::record::RecordArgs),

    /// Generate a report from stored entries
    #[command(subcommand)]
    Report(commands::report::ReportCommand),

    /// Chat with the assistant about your work log
    Chat,

    /// Check that the backend is reachable
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    if args.init_config {
        let path = config::Config::init()?;
        println!("config file at {}", path.display());
        return Ok(());
    }

    let Some(command) = args.command else {
        anyhow::bail!("no command given; run with --help for usage");
    };

    let config = config::Config::load();
    let client = ApiClient::new(config.resolve_base_url(args.base_url));

    match command {
        Command::Record(record_args) => commands::record::run(&client, record_args).await,
        Command::Report(report_command) => commands::report::run(&client, report_command).await,
        Command::Chat => commands::chat::run(client).await,
        Command::Health => {
            client.health().await?;
            println!("backend is reachable at {}", client.base_url());
            Ok(())
        }
    }
}
