//! Binary entry point for the `dosnap` snapshotter host.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tokio::io::BufReader;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use dosnap::{PluginError, PluginHost};

mod cli;

use cli::{Cli, LogFormat, ServeCommand};

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to install log subscriber: {0}")]
    Logging(String),
    #[error(transparent)]
    Plugin(#[from] PluginError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli {
        Cli::Serve(command) => serve(command).await,
    }
}

async fn serve(command: ServeCommand) -> Result<(), CliError> {
    init_logging(command.log_format)?;
    let mut host = PluginHost::digitalocean();
    host.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_logging(format: LogFormat) -> Result<(), CliError> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let installed = match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(io::stderr).with_ansi(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
    };
    installed.map_err(|err| CliError::Logging(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
