//! `reel` command-line binary.

mod cli;
mod commands;
mod config;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;
use config::AppConfig;

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let directive = if verbose { "reel=debug" } else { "reel=info" };
    let env_filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = AppConfig::from_env().with_overrides(cli.media_root.clone(), cli.ffmpeg_timeout);
    info!(media_root = %config.media_root.path().display(), "Starting reel");

    match commands::execute(cli.command, &config).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            Err(e)
        }
    }
}
