//! Otakudesu adapter.
//!
//! Catalog-style site: genre grids, keyword search, an ongoing listing,
//! detail pages with an info table, and episode pages carrying download
//! tables and stream mirror tokens. Mirror tokens are resolved through a
//! nonce handshake against the WordPress AJAX endpoint.

pub mod parse;
pub mod stream;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{recover, SourceKind};
use crate::config::OtakudesuConfig;
use crate::error::Result;
use crate::fingerprint::FingerprintOptions;
use crate::http_client::SourceClient;
use crate::model::{
    AnimeDetail, CatalogEntry, DownloadSet, EpisodeList, MirrorSet, MirrorToken, OngoingEntry,
    VideoEmbed,
};

pub use parse::SearchLayout;

const AJAX_PATH: &str = "wp-admin/admin-ajax.php";
const SOURCE: SourceKind = SourceKind::Otakudesu;

/// Filters for [`Otakudesu::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Genre names. Only the first is sent; the site filters by one genre.
    pub genres: Vec<String>,
}

/// Otakudesu scraper bound to one origin.
pub struct Otakudesu {
    client: SourceClient,
    config: OtakudesuConfig,
}

impl Otakudesu {
    pub fn new(config: &OtakudesuConfig, fingerprint: FingerprintOptions) -> Result<Self> {
        Ok(Self {
            client: SourceClient::new(&config.source, fingerprint)?,
            config: config.clone(),
        })
    }

    /// Search by keyword, or by genre when `query` is empty.
    ///
    /// `page` only applies to genre listings. Returns `[]` when neither a
    /// query nor a genre is given, and when the site bounces the search to
    /// its front page.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        options: &SearchOptions,
    ) -> Vec<CatalogEntry> {
        let query = query.trim();
        let (path, params, layout) = if !query.is_empty() {
            (
                String::new(),
                vec![("s", query), ("post_type", "anime")],
                SearchLayout::KeywordList,
            )
        } else if let Some(genre) = options.genres.first() {
            if options.genres.len() > 1 {
                debug!(dropped = ?&options.genres[1..], "Genre search uses the first genre only");
            }
            (
                format!("genres/{}/page/{page}", genre_slug(genre)),
                Vec::new(),
                SearchLayout::GenreGrid,
            )
        } else {
            return Vec::new();
        };

        let result: Result<_> = async {
            let response = self.client.get(&path, &params).await?;
            if response.redirected_home() {
                debug!(url = %response.final_url, "Search redirected to front page");
                return Ok(Vec::new());
            }
            Ok(layout.parse(&response.body))
        }
        .await;

        recover(SOURCE, "search", query, result, Vec::new)
    }

    /// One page of the ongoing-series listing.
    pub async fn home_page(&self, page: u32) -> Vec<OngoingEntry> {
        let path = format!("ongoing-anime/page/{page}");
        let result: Result<_> = async {
            let response = self.client.get(&path, &[]).await?;
            Ok(parse::parse_ongoing(&response.body))
        }
        .await;

        recover(SOURCE, "home_page", &path, result, Vec::new)
    }

    /// Detail page of a series.
    ///
    /// `None` for URLs outside `<origin>/anime/` and on any failure. The
    /// episode list is not included; fetch it with [`episodes`](Self::episodes).
    pub async fn anime(&self, url: &str) -> Option<AnimeDetail> {
        let series_prefix = format!("{}/anime/", self.config.source.origin());
        if !url.starts_with(&series_prefix) {
            debug!(url, "Not an Otakudesu series URL");
            return None;
        }

        let result: Result<_> = async {
            let response = self.client.get(url, &[]).await?;
            Ok(Some(parse::parse_anime(&response.body)))
        }
        .await;

        recover(SOURCE, "anime", url, result, || None)
    }

    /// Episode list of a series page.
    pub async fn episodes(&self, url: &str) -> EpisodeList {
        if url.is_empty() {
            return EpisodeList::default();
        }

        let result: Result<_> = async {
            let response = self.client.get(url, &[]).await?;
            Ok(parse::parse_episodes(&response.body))
        }
        .await;

        recover(SOURCE, "episodes", url, result, EpisodeList::default)
    }

    /// Download table of an episode page.
    pub async fn download_links(&self, url: &str) -> DownloadSet {
        if url.is_empty() {
            return DownloadSet::default();
        }

        let result: Result<_> = async {
            let response = self.client.get(url, &[]).await?;
            Ok(parse::parse_download_set(&response.body))
        }
        .await;

        recover(SOURCE, "download_links", url, result, DownloadSet::default)
    }

    /// Stream mirror tokens of an episode page, grouped by quality.
    pub async fn mirrors(&self, url: &str) -> MirrorSet {
        if url.is_empty() {
            return MirrorSet::default();
        }

        let result: Result<_> = async {
            let response = self.client.get(url, &[]).await?;
            Ok(parse::parse_mirrors(&response.body))
        }
        .await;

        recover(SOURCE, "mirrors", url, result, MirrorSet::default)
    }

    /// Resolve a mirror token to its player URL.
    ///
    /// Tokens are session-bound upstream, so resolve them shortly after
    /// [`mirrors`](Self::mirrors) returned them. An undecodable token fails
    /// before any request is made.
    pub async fn video(&self, token: &MirrorToken) -> VideoEmbed {
        let result = self.resolve_mirror(token).await;
        let iframe = recover(SOURCE, "video", &token.0, result, || None);
        VideoEmbed { iframe }
    }

    async fn resolve_mirror(&self, token: &MirrorToken) -> Result<Option<String>> {
        let mirror = token.decode()?;

        let nonce_body = self
            .client
            .post_form(AJAX_PATH, &[("action", self.config.nonce_action.as_str())])
            .await?;
        let Some(nonce) = stream::nonce_from(&nonce_body)? else {
            tracing::warn!(source = %SOURCE, "No nonce in handshake reply");
            return Ok(None);
        };

        let player_body = self
            .client
            .post_form(
                AJAX_PATH,
                &[
                    ("id", mirror.id.as_str()),
                    ("i", mirror.i.as_str()),
                    ("q", mirror.q.as_str()),
                    ("nonce", nonce.as_str()),
                    ("action", self.config.stream_action.as_str()),
                ],
            )
            .await?;

        stream::player_url_from(&player_body)
    }
}

/// Genre name to URL slug: lowercase, whitespace runs become `-`.
fn genre_slug(genre: &str) -> String {
    static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
    WHITESPACE.replace_all(&genre.to_lowercase(), "-").into_owned()
}
