//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geoforge")]
#[command(
    author,
    version,
    about = "Generate per-category geo rule sets from IP/domain block and allow lists"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download configured sources and write them as list files
    Fetch {
        /// Path to the sources.json descriptor file
        #[arg(short, long, default_value = "sources.json")]
        sources: PathBuf,

        /// Directory to write list files into (defaults to the config's path)
        #[arg(short, long)]
        input_dir: Option<PathBuf>,
    },

    /// Generate rule-set artifacts from a directory of list files
    Generate {
        /// Directory of {include|exclude}-{ip|domain}-{category}.{lst|rgx} files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for generated artifacts
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Show version
    Version,
}
