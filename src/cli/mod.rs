//! Command-line interface definitions for the `dosnap` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Parser, ValueEnum};

/// Top-level CLI for the `dosnap` binary.
#[derive(Debug, Parser)]
#[command(
    name = "dosnap",
    about = "Snapshot and restore DigitalOcean block volumes for backup orchestrators",
    version,
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Serve snapshotter requests over stdin and stdout.
    #[command(
        name = "serve",
        about = "Serve line-delimited JSON snapshotter requests over stdio"
    )]
    Serve(ServeCommand),
}

/// Arguments for the `dosnap serve` subcommand.
#[derive(Debug, Parser)]
pub(crate) struct ServeCommand {
    /// Format of diagnostic output written to stderr.
    ///
    /// Responses always go to stdout; logs never do.
    #[arg(
        long,
        value_enum,
        value_name = "FORMAT",
        default_value_t = LogFormat::Text,
        env = "DOSNAP_LOG_FORMAT"
    )]
    pub(crate) log_format: LogFormat,
}

/// Rendering of log records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub(crate) enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per record.
    Json,
}
