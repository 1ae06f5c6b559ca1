//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rotalog")]
#[command(version, about = "Write stdin or process output to size and time rotated log files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy stdin lines into a rotating log
    Tee(TeeArgs),

    /// Run a command and capture its stdout and stderr
    Run(RunArgs),

    /// Roll the log over now, regardless of size or schedule
    Rotate(DestinationArgs),

    /// Show the resolved destination, next rollover, and existing backups
    Describe(DestinationArgs),
}

/// Where to write and how to rotate.
///
/// `--path` builds a destination from the flags alone. Otherwise the
/// destination comes from `--config`, or a rotalog config file in the current
/// directory, picked by `--name`. The remaining flags override file values.
#[derive(Args, Debug, Clone, Default)]
pub struct DestinationArgs {
    /// Config file declaring destinations
    #[arg(short, long, env = "ROTALOG_CONFIG", conflicts_with = "path")]
    pub config: Option<PathBuf>,

    /// Destination name in the config file, or a log under ~/.rotalog/logs
    #[arg(short, long)]
    pub name: Option<String>,

    /// Log file path
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Roll over before a write would exceed this many bytes (0 disables)
    #[arg(long)]
    pub max_bytes: Option<u64>,

    /// Numbered backups to keep (0 overwrites a single archive)
    #[arg(long)]
    pub backup_count: Option<usize>,

    /// Rollover unit: S, M, H, D, MIDNIGHT, or W0-W6 (Monday = 0)
    #[arg(long)]
    pub when: Option<String>,

    /// Units between time rollovers (0 disables)
    #[arg(long)]
    pub interval: Option<u32>,

    /// Schedule and name archives in UTC instead of local time
    #[arg(long)]
    pub utc: bool,

    /// Line written at the top of every new segment
    #[arg(long)]
    pub header: Option<String>,

    /// Open the file on first write instead of at startup
    #[arg(long)]
    pub delay: bool,

    /// Truncate an existing file on startup (ignored when --max-bytes is set)
    #[arg(long)]
    pub truncate: bool,
}

#[derive(Args)]
pub struct TeeArgs {
    #[command(flatten)]
    pub destination: DestinationArgs,

    /// Also copy lines to stdout
    #[arg(long)]
    pub echo: bool,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub destination: DestinationArgs,

    /// Also copy the command's output to the console
    #[arg(long)]
    pub echo: bool,

    /// Command and arguments, after `--`
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}
