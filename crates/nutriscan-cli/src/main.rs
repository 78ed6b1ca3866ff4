mod live;
mod scan;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nutriscan_core::AppConfig;
use tracing_subscriber::EnvFilter;

/// Log level for commands that run without loading the app config.
const OFFLINE_LOG_LEVEL: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "nutriscan")]
#[command(about = "Scan a product barcode and score its nutrition")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a barcode entered by hand
    Barcode {
        /// Barcode digits; separators are ignored
        digits: String,
    },
    /// Find a barcode in a product photo and analyze it
    Image {
        /// Photo of the product (jpg, jpeg, png, gif, bmp, webp)
        path: PathBuf,
    },
    /// List every barcode found in a photo at each rotation, without lookups
    Decode { path: PathBuf },
    /// Run a live capture session over a directory of frames
    Live {
        /// Directory of frames, replayed in file-name order
        #[arg(long)]
        frames: PathBuf,
        /// Session time limit (defaults to `NUTRISCAN_SESSION_TIMEOUT_SECS`)
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Keep scanning after a result instead of stopping
        #[arg(long)]
        continuous: bool,
        /// Also write the final result to this file for a waiting process
        #[arg(long)]
        handoff: Option<PathBuf>,
        /// Directory for results saved with the `s` key
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Print and remove a result left by `live --handoff`
    Handoff { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { path } => {
            init_tracing(OFFLINE_LOG_LEVEL)?;
            scan::run_decode(&path)
        }
        Commands::Handoff { path } => {
            init_tracing(OFFLINE_LOG_LEVEL)?;
            live::run_handoff(&path)
        }
        Commands::Barcode { digits } => {
            let config = load_config()?;
            scan::run_barcode(&config, &digits).await
        }
        Commands::Image { path } => {
            let config = load_config()?;
            scan::run_image(&config, &path).await
        }
        Commands::Live {
            frames,
            timeout_secs,
            continuous,
            handoff,
            output_dir,
        } => {
            let config = load_config()?;
            let options = live::LiveOptions {
                frames,
                timeout_secs,
                continuous,
                handoff,
                output_dir,
            };
            live::run_live(&config, options).await
        }
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = nutriscan_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    Ok(config)
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests;
