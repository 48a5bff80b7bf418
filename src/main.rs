//! geoforge - per-category geo rule sets from IP/domain block and allow
//! lists.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use geoforge::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Fetch { sources, input_dir } => {
            geoforge::commands::fetch::run(&sources, input_dir).await
        }
        Commands::Generate {
            input_dir,
            output_dir,
        } => geoforge::commands::generate::run(&input_dir, &output_dir),
        Commands::Version => {
            println!("geoforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
