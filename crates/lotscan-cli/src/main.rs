use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "lotscan")]
#[command(about = "Analyze used-vehicle marketplace listings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full pipeline against a listing URL
    Analyze {
        url: String,
        /// Print the full report as JSON instead of the Markdown text
        #[arg(long)]
        json: bool,
    },
    /// Print the marketplace a URL belongs to
    Platform { url: String },
    /// Expand shortened links and strip tracking parameters
    Normalize {
        url: String,
        #[arg(long, default_value_t = 5)]
        max_depth: u32,
    },
    /// Run text and image extraction over a saved HTML page
    Extract {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze { url, json } => commands::run_analyze(&url, json).await,
        Commands::Platform { url } => {
            println!("{}", lotscan_scraper::Platform::identify(&url));
            Ok(())
        }
        Commands::Normalize { url, max_depth } => commands::run_normalize(&url, max_depth).await,
        Commands::Extract { file, json } => commands::run_extract(&file, json),
    }
}
