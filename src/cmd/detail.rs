use anyhow::{bail, Result};

use anisrc::{Config, Otakudesu, Samehadaku, SourceKind};

use super::output::print_found;

/// Detail page of any supported series URL.
///
/// Otakudesu serves the episode list separately, so both are fetched
/// together and merged here.
pub async fn cmd_detail(config: &Config, url: &str) -> Result<()> {
    let Some(kind) = SourceKind::detect(url, config) else {
        bail!("No source handles {url}");
    };
    tracing::debug!(source = %kind, url, "Resolved source");

    let detail = match kind {
        SourceKind::Otakudesu => {
            let otakudesu = Otakudesu::new(&config.otakudesu, config.fingerprint.clone())?;
            let (detail, list) = tokio::join!(otakudesu.anime(url), otakudesu.episodes(url));
            detail.map(|mut detail| {
                detail.episodes = list.episodes;
                detail
            })
        }
        SourceKind::Samehadaku => {
            let samehadaku = Samehadaku::new(&config.samehadaku, config.fingerprint.clone())?;
            samehadaku.anime(url).await
        }
    };

    print_found(detail, "Anime")
}
