use anyhow::Result;
use serde::Serialize;

use anisrc::{Config, LatestEntry, Samehadaku, TopTenEntry};

use super::output::print_json;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HomeFeed {
    latest: Vec<LatestEntry>,
    top_ten: Vec<TopTenEntry>,
}

/// Latest releases, plus the weekly top ten on the first page.
pub async fn cmd_home(config: &Config, page: u32) -> Result<()> {
    let samehadaku = Samehadaku::new(&config.samehadaku, config.fingerprint.clone())?;

    let top_ten = async {
        if page <= 1 {
            samehadaku.top_ten_week().await
        } else {
            Vec::new()
        }
    };
    let (latest, top_ten) = tokio::join!(samehadaku.anime_list(page), top_ten);

    print_json(&HomeFeed { latest, top_ten })
}
