use anyhow::Result;
use clap::Subcommand;

use anisrc::{Config, MirrorToken, Otakudesu, SearchOptions};

use super::output::{print_found, print_json};

#[derive(Subcommand)]
pub enum OtakudesuCommand {
    /// Search by keyword, or list a genre when no keyword is given
    Search {
        /// Keyword
        #[arg(default_value = "")]
        query: String,

        /// Genre name (only the first is used)
        #[arg(short, long = "genre")]
        genres: Vec<String>,

        /// Page of a genre listing
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Ongoing series
    Home {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Series detail page (without episodes)
    Anime {
        /// Series URL (`<origin>/anime/...`)
        url: String,
    },

    /// Episode list of a series
    Episodes { url: String },

    /// Download links of an episode
    Downloads { url: String },

    /// Stream mirror tokens of an episode
    Mirrors { url: String },

    /// Resolve a mirror token to its player URL
    Video {
        /// `dataContent` value from `mirrors`
        token: String,
    },
}

pub async fn cmd_otakudesu(config: &Config, command: OtakudesuCommand) -> Result<()> {
    let otakudesu = Otakudesu::new(&config.otakudesu, config.fingerprint.clone())?;

    match command {
        OtakudesuCommand::Search { query, genres, page } => {
            print_json(&otakudesu.search(&query, page, &SearchOptions { genres }).await)
        }
        OtakudesuCommand::Home { page } => print_json(&otakudesu.home_page(page).await),
        OtakudesuCommand::Anime { url } => print_found(otakudesu.anime(&url).await, "Anime"),
        OtakudesuCommand::Episodes { url } => print_json(&otakudesu.episodes(&url).await),
        OtakudesuCommand::Downloads { url } => print_json(&otakudesu.download_links(&url).await),
        OtakudesuCommand::Mirrors { url } => print_json(&otakudesu.mirrors(&url).await),
        OtakudesuCommand::Video { token } => {
            print_json(&otakudesu.video(&MirrorToken(token)).await)
        }
    }
}
