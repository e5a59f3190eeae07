//! Binary entry point for `care-triage`.
//!
//! This module provides the command-line interface for care-triage with options
//! for configuration file paths and logging verbosity. It either classifies a
//! single message or starts an interactive session.

use care_triage::base::{config::Config, types::Void};
use clap::Parser;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Care-triage – a supportive keyword-triage chat for students.
///
/// Configuration can come from `config.toml` or environment variables.
/// Messages mentioning self-harm or suicide are always answered with
/// crisis guidance and helpline numbers before any other topic is considered.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the tool will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Print the reply as JSON (`topicId`, `responseText`, `isCrisis`, and `crisisResources` on escalation).
    ///
    /// Only applies when a message is given.
    #[arg(long)]
    json: bool,
    /// Classify this message once and exit instead of starting a session.
    message: Option<String>,
}

/// Main entry point for the care-triage binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stderr = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    tracing_subscriber::registry().with(level_filter).with(stderr).init();

    let config = Config::load(args.config.as_deref())?;

    let Some(message) = args.message else {
        return care_triage::start(config).await;
    };

    // One-shot mode.

    let out = care_triage::reply_once(&config, &message)?.render(args.json)?;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(out.as_bytes()).await?;
    stdout.flush().await?;

    Ok(())
}
