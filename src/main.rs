//! `anisrc` CLI - Scrape anime catalogs, episodes and stream mirrors

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use anisrc::Config;

use cmd::{OtakudesuCommand, SamehadakuCommand};

#[derive(Parser)]
#[command(name = "anisrc")]
#[command(about = "Anime catalog, episode and stream-mirror scraper")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/anisrc/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate browser fingerprints
    Fingerprint {
        /// Number of profiles to generate
        #[arg(short, long, default_value = "3")]
        count: usize,

        /// Print profiles as JSON
        #[arg(long)]
        json: bool,
    },

    /// Otakudesu operations
    #[command(subcommand)]
    Otakudesu(OtakudesuCommand),

    /// Samehadaku operations
    #[command(subcommand)]
    Samehadaku(SamehadakuCommand),

    /// Series detail of any supported URL
    Detail {
        /// Series URL on either site
        url: String,
    },

    /// Latest releases with the weekly top ten
    Home {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Fingerprint { count, json } => {
            cmd::cmd_fingerprint(count, &config.fingerprint, json)?;
        }
        Commands::Otakudesu(command) => {
            cmd::cmd_otakudesu(&config, command).await?;
        }
        Commands::Samehadaku(command) => {
            cmd::cmd_samehadaku(&config, command).await?;
        }
        Commands::Detail { url } => {
            cmd::cmd_detail(&config, &url).await?;
        }
        Commands::Home { page } => {
            cmd::cmd_home(&config, page).await?;
        }
    }

    Ok(())
}
