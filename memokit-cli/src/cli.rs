//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// memokit — delayed random numbers and JSON fetching from the terminal
#[derive(Parser, Debug)]
#[command(name = "memokit")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "MEMOKIT_CONFIG", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short = 'l', long, env = "MEMOKIT_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Stream delayed random numbers, one per line
    Numbers {
        /// How many numbers to produce
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Pause before each number, in milliseconds
        #[arg(short = 'd', long)]
        delay_ms: Option<u64>,
    },

    /// GET a URL and print its JSON body
    Fetch {
        /// URL to fetch
        url: String,

        /// Dotted path into the body, e.g. `license.key`
        #[arg(short = 'p', long)]
        path: Option<String>,
    },
}
