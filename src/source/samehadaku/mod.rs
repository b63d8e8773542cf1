//! Samehadaku adapter.
//!
//! Listing-style site. Episode pages embed player server descriptors that
//! resolve to iframe URLs through the `player_ajax` endpoint; every server
//! of a page is resolved concurrently.

pub mod parse;

use futures::future::join_all;

use super::{recover, SourceKind};
use crate::config::SourceConfig;
use crate::error::Result;
use crate::fingerprint::FingerprintOptions;
use crate::http_client::SourceClient;
use crate::model::{
    AnimeDetail, CatalogEntry, EpisodeDetail, LatestEntry, ScheduleDay, ServerDescriptor,
    StreamServer, TopTenEntry,
};

const AJAX_PATH: &str = "wp-admin/admin-ajax.php";
const PLAYER_ACTION: &str = "player_ajax";
const SOURCE: SourceKind = SourceKind::Samehadaku;

/// Filters for [`Samehadaku::search`]. Empty strings mean "any".
#[derive(Debug, Clone)]
pub struct SearchFilter {
    pub status: String,
    /// Series type (TV, Movie, OVA, ...).
    pub kind: String,
    pub order: String,
    pub genres: Vec<String>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            status: String::new(),
            kind: String::new(),
            order: "title".to_string(),
            genres: Vec::new(),
        }
    }
}

/// Samehadaku scraper bound to one origin.
pub struct Samehadaku {
    client: SourceClient,
}

impl Samehadaku {
    pub fn new(config: &SourceConfig, fingerprint: FingerprintOptions) -> Result<Self> {
        Ok(Self {
            client: SourceClient::new(config, fingerprint)?,
        })
    }

    /// Weekly top ten from the front page.
    pub async fn top_ten_week(&self) -> Vec<TopTenEntry> {
        let result: Result<_> = async {
            let response = self.client.get("", &[]).await?;
            Ok(parse::parse_top_ten(&response.body))
        }
        .await;

        recover(SOURCE, "top_ten_week", "/", result, Vec::new)
    }

    /// One page of the latest-release listing.
    pub async fn anime_list(&self, page: u32) -> Vec<LatestEntry> {
        let path = paged("anime-terbaru/", page);
        let result: Result<_> = async {
            let response = self.client.get(&path, &[]).await?;
            Ok(parse::parse_latest(&response.body))
        }
        .await;

        recover(SOURCE, "anime_list", &path, result, Vec::new)
    }

    /// Advanced search over the full catalog.
    pub async fn search(&self, query: &str, page: u32, filter: &SearchFilter) -> Vec<CatalogEntry> {
        let path = paged("daftar-anime-2/", page);

        let mut params = vec![
            ("title", query),
            ("status", filter.status.as_str()),
            ("type", filter.kind.as_str()),
            ("order", filter.order.as_str()),
        ];
        params.extend(filter.genres.iter().map(|genre| ("genre[]", genre.as_str())));

        let result: Result<_> = async {
            let response = self.client.get(&path, &params).await?;
            Ok(parse::parse_search(&response.body))
        }
        .await;

        recover(SOURCE, "search", query, result, Vec::new)
    }

    /// Detail page of a series, episode list included.
    pub async fn anime(&self, url: &str) -> Option<AnimeDetail> {
        if url.is_empty() {
            return None;
        }

        let result: Result<_> = async {
            let response = self.client.get(url, &[]).await?;
            Ok(Some(parse::parse_anime(&response.body)))
        }
        .await;

        recover(SOURCE, "anime", url, result, || None)
    }

    /// Episode page with every player server resolved.
    ///
    /// Servers are resolved concurrently and reported in page order; a
    /// server that fails to resolve gets `iframe: None` without affecting
    /// the others.
    pub async fn episode(&self, url: &str) -> Option<EpisodeDetail> {
        if url.is_empty() {
            return None;
        }

        let result: Result<_> = async {
            let response = self.client.get(url, &[]).await?;
            Ok(parse::parse_episode(&response.body))
        }
        .await;
        let page = recover(SOURCE, "episode", url, result.map(Some), || None)?;

        let mut detail = page.detail;
        detail.stream_servers =
            join_all(page.servers.iter().map(|server| self.resolve_server(server))).await;
        Some(detail)
    }

    async fn resolve_server(&self, server: &ServerDescriptor) -> StreamServer {
        let Some((post, nume, kind)) = server.triple() else {
            tracing::debug!(server = %server.name, "Server descriptor incomplete");
            return StreamServer {
                server: server.name.clone(),
                iframe: None,
            };
        };

        let result: Result<_> = async {
            let fragment = self
                .client
                .post_form(
                    AJAX_PATH,
                    &[("action", PLAYER_ACTION), ("post", post), ("nume", nume), ("type", kind)],
                )
                .await?;
            Ok(parse::parse_player_iframe(&fragment))
        }
        .await;

        StreamServer {
            server: server.name.clone(),
            iframe: recover(SOURCE, "player", &server.name, result, || None),
        }
    }

    /// Weekly release schedule.
    pub async fn schedule(&self) -> Vec<ScheduleDay> {
        let result: Result<_> = async {
            let response = self.client.get("jadwal-rilis/", &[]).await?;
            Ok(parse::parse_schedule(&response.body))
        }
        .await;

        recover(SOURCE, "schedule", "jadwal-rilis/", result, Vec::new)
    }
}

/// `base` for page 1, `base/page/<n>/` after that.
fn paged(base: &str, page: u32) -> String {
    if page <= 1 {
        base.to_string()
    } else {
        format!("{base}page/{page}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paged_paths() {
        assert_eq!(paged("anime-terbaru/", 1), "anime-terbaru/");
        assert_eq!(paged("anime-terbaru/", 0), "anime-terbaru/");
        assert_eq!(paged("daftar-anime-2/", 3), "daftar-anime-2/page/3/");
    }

    #[test]
    fn default_filter_orders_by_title() {
        let filter = SearchFilter::default();
        assert_eq!(filter.order, "title");
        assert!(filter.genres.is_empty());
    }

    #[tokio::test]
    async fn empty_urls_short_circuit() {
        let config = SourceConfig::new("https://v1.samehadaku.how");
        let samehadaku = Samehadaku::new(&config, FingerprintOptions::default()).unwrap();
        assert!(samehadaku.anime("").await.is_none());
        assert!(samehadaku.episode("").await.is_none());
    }

    #[tokio::test]
    async fn incomplete_descriptor_skips_request() {
        let config = SourceConfig::new("http://127.0.0.1:9");
        let samehadaku = Samehadaku::new(&config, FingerprintOptions::default()).unwrap();
        let server = ServerDescriptor {
            name: "Blogspot".to_string(),
            post: Some("1".to_string()),
            ..ServerDescriptor::default()
        };
        let resolved = samehadaku.resolve_server(&server).await;
        assert_eq!(resolved.server, "Blogspot");
        assert_eq!(resolved.iframe, None);
    }
}
