use anyhow::Result;
use clap::Subcommand;

use anisrc::{Config, Samehadaku, SearchFilter};

use super::output::{print_found, print_json};

#[derive(Subcommand)]
pub enum SamehadakuCommand {
    /// Weekly top ten
    TopTen,

    /// Latest releases
    Latest {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Advanced catalog search
    Search {
        /// Title keyword
        #[arg(default_value = "")]
        query: String,

        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Status filter (e.g. "Currently Airing")
        #[arg(long, default_value = "")]
        status: String,

        /// Type filter (TV, Movie, OVA, ...)
        #[arg(long = "type", default_value = "")]
        kind: String,

        /// Sort order
        #[arg(long, default_value = "title")]
        order: String,

        /// Genre slug, repeatable
        #[arg(short, long = "genre")]
        genres: Vec<String>,
    },

    /// Series detail page with episodes
    Anime { url: String },

    /// Episode page with resolved player servers
    Episode { url: String },

    /// Weekly release schedule
    Schedule,
}

pub async fn cmd_samehadaku(config: &Config, command: SamehadakuCommand) -> Result<()> {
    let samehadaku = Samehadaku::new(&config.samehadaku, config.fingerprint.clone())?;

    match command {
        SamehadakuCommand::TopTen => print_json(&samehadaku.top_ten_week().await),
        SamehadakuCommand::Latest { page } => print_json(&samehadaku.anime_list(page).await),
        SamehadakuCommand::Search {
            query,
            page,
            status,
            kind,
            order,
            genres,
        } => {
            let filter = SearchFilter {
                status,
                kind,
                order,
                genres,
            };
            print_json(&samehadaku.search(&query, page, &filter).await)
        }
        SamehadakuCommand::Anime { url } => print_found(samehadaku.anime(&url).await, "Anime"),
        SamehadakuCommand::Episode { url } => {
            print_found(samehadaku.episode(&url).await, "Episode")
        }
        SamehadakuCommand::Schedule => print_json(&samehadaku.schedule().await),
    }
}
