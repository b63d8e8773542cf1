//! Page parsers for Otakudesu.
//!
//! Pure functions over HTML text. The parsed document never outlives the
//! call, so adapters can await freely around them.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::extract::{
    clean_text, element_text, episode_number, episode_title, resolution_key, resolve_image,
    select_attr, select_first, select_text, selector, title_or_raw,
};
use crate::model::{
    AnimeDetail, CatalogEntry, DownloadSet, DownloadSource, EpisodeList, EpisodeRef, MirrorEntry,
    MirrorSet, MirrorToken, OngoingEntry,
};

/// Synopsis used when the detail page has none.
pub const MISSING_SYNOPSIS: &str = "Sinopsis tidak tersedia.";

/// Info-table labels and the keys they map to, in lookup order.
const INFO_LABELS: &[(&str, &str)] = &[
    ("Judul", "title"),
    ("Skor", "rating"),
    ("Produser", "produser"),
    ("Status", "status"),
    ("Total Episode", "totalEpisode"),
    ("Durasi", "duration"),
    ("Tanggal Rilis", "released"),
    ("Studio", "studio"),
];

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static STRONG: Lazy<Selector> = Lazy::new(|| selector("strong"));

static GRID_ITEM: Lazy<Selector> = Lazy::new(|| selector(".col-anime"));
static GRID_TITLE: Lazy<Selector> = Lazy::new(|| selector(".col-anime-title a"));
static GRID_COVER: Lazy<Selector> = Lazy::new(|| selector(".col-anime-cover img"));
static GRID_RATING: Lazy<Selector> = Lazy::new(|| selector(".col-anime-rating"));
static GRID_EPISODES: Lazy<Selector> = Lazy::new(|| selector(".col-anime-eps"));

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| selector("ul.chivsrc li"));
static LIST_TITLE: Lazy<Selector> = Lazy::new(|| selector("h2 a"));
static LIST_FACT: Lazy<Selector> = Lazy::new(|| selector(".set"));

static ONGOING_ITEM: Lazy<Selector> = Lazy::new(|| selector(".venz ul li"));
static ONGOING_TITLE: Lazy<Selector> = Lazy::new(|| selector(".jdlflm"));
static ONGOING_EPISODE: Lazy<Selector> = Lazy::new(|| selector(".epz"));
static ONGOING_RELEASED: Lazy<Selector> = Lazy::new(|| selector(".newnime"));

static SYNOPSIS_PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector(".sinopc p"));
static INFO_ROW: Lazy<Selector> = Lazy::new(|| selector("div.infozin div.infozingle p"));
static INFO_LINK: Lazy<Selector> = Lazy::new(|| selector("div.infozin div.infozingle a"));
static COVER: Lazy<Selector> = Lazy::new(|| selector(".fotoanime img"));

static TITLE_SPAN: Lazy<Selector> = Lazy::new(|| selector("p span"));
static EPISODE_LINK: Lazy<Selector> = Lazy::new(|| selector("div.episodelist ul li a"));

static DOWNLOAD_HEADING: Lazy<Selector> = Lazy::new(|| selector("div.download h4"));
static DOWNLOAD_ROW: Lazy<Selector> = Lazy::new(|| selector("div.download ul > li"));

static MIRROR_360: Lazy<Selector> = Lazy::new(|| selector("div.mirrorstream ul.m360p a"));
static MIRROR_480: Lazy<Selector> = Lazy::new(|| selector("div.mirrorstream ul.m480p a"));
static MIRROR_720: Lazy<Selector> = Lazy::new(|| selector("div.mirrorstream ul.m720p a"));

/// The two result page shapes of the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchLayout {
    /// `/genres/<slug>/page/<n>` cards.
    GenreGrid,
    /// `/?s=<query>` result list.
    KeywordList,
}

impl SearchLayout {
    #[must_use]
    pub fn parse(self, html: &str) -> Vec<CatalogEntry> {
        match self {
            Self::GenreGrid => parse_genre_grid(html),
            Self::KeywordList => parse_keyword_list(html),
        }
    }
}

/// Parse a genre listing page.
#[must_use]
pub fn parse_genre_grid(html: &str) -> Vec<CatalogEntry> {
    let doc = Html::parse_document(html);
    doc.select(&GRID_ITEM)
        .map(|card| {
            let raw_title = select_text(card, &GRID_TITLE);
            CatalogEntry {
                title: title_or_raw(&raw_title),
                url: select_attr(card, &GRID_TITLE, "href").unwrap_or_default(),
                image: resolve_image(select_first(card, &GRID_COVER)),
                rating: Some(select_text(card, &GRID_RATING)),
                episodes: Some(select_text(card, &GRID_EPISODES)),
                ..CatalogEntry::default()
            }
        })
        .collect()
}

/// Parse a keyword search result page.
#[must_use]
pub fn parse_keyword_list(html: &str) -> Vec<CatalogEntry> {
    let doc = Html::parse_document(html);
    doc.select(&LIST_ITEM)
        .map(|item| {
            let raw_title = select_text(item, &LIST_TITLE);

            let mut status = String::new();
            let mut rating = String::new();
            for fact in item.select(&LIST_FACT) {
                let text: String = fact.text().collect();
                if text.contains("Status") {
                    status = text.replacen("Status :", "", 1).trim().to_string();
                }
                if text.contains("Rating") {
                    rating = text.replacen("Rating :", "", 1).trim().to_string();
                }
            }

            CatalogEntry {
                title: title_or_raw(&raw_title),
                url: select_attr(item, &LIST_TITLE, "href").unwrap_or_default(),
                image: resolve_image(select_first(item, &IMG)),
                status: Some(status),
                rating: Some(rating),
                ..CatalogEntry::default()
            }
        })
        .collect()
}

/// Parse one page of the ongoing-series listing.
#[must_use]
pub fn parse_ongoing(html: &str) -> Vec<OngoingEntry> {
    let doc = Html::parse_document(html);
    doc.select(&ONGOING_ITEM)
        .map(|item| {
            let raw_title = select_text(item, &ONGOING_TITLE);
            OngoingEntry {
                title: title_or_raw(&raw_title),
                image: resolve_image(select_first(item, &IMG)),
                url: select_attr(item, &ANCHOR, "href").unwrap_or_default(),
                episode: episode_number(&select_text(item, &ONGOING_EPISODE)),
                released: select_text(item, &ONGOING_RELEASED),
            }
        })
        .collect()
}

/// Parse a series detail page. `episodes` is left empty.
#[must_use]
pub fn parse_anime(html: &str) -> AnimeDetail {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let synopsis = root
        .select(&SYNOPSIS_PARAGRAPH)
        .map(element_text)
        .collect::<Vec<_>>()
        .join("\n");

    let mut detail = AnimeDetail {
        synopsis: if synopsis.is_empty() {
            MISSING_SYNOPSIS.to_string()
        } else {
            synopsis
        },
        image: resolve_image(select_first(root, &COVER)),
        ..AnimeDetail::default()
    };

    for row in root.select(&INFO_ROW) {
        let text: String = row.text().collect();
        for &(label, key) in INFO_LABELS {
            if !text.contains(label) {
                continue;
            }
            let value = text.replacen(label, "", 1).replacen(':', "", 1).trim().to_string();
            match key {
                "title" => detail.title = title_or_raw(&value),
                "rating" => detail.rating = Some(value),
                "status" => detail.status = Some(value),
                _ => detail.insert_metadata(key, value),
            }
        }
    }

    detail.genres = root
        .select(&INFO_LINK)
        .filter(|a| a.value().attr("href").is_some_and(|href| href.contains("/genres/")))
        .map(element_text)
        .collect();

    detail
}

/// Parse the episode list of a series page.
#[must_use]
pub fn parse_episodes(html: &str) -> EpisodeList {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let heading: String = root
        .select(&TITLE_SPAN)
        .map(|span| span.text().collect::<String>())
        .filter(|text| text.contains("Judul"))
        .collect();
    let raw_title = strip_label(&heading, "Judul");
    let title = Some(title_or_raw(&raw_title)).filter(|t| !t.is_empty());

    let episodes = root
        .select(&EPISODE_LINK)
        .filter_map(|a| {
            let url = a.value().attr("href")?;
            if !url.contains("/episode/") {
                return None;
            }
            let label: String = a.text().collect();
            Some(EpisodeRef {
                title: episode_title(&label),
                url: url.to_string(),
                date: None,
            })
        })
        .collect();

    EpisodeList { title, episodes }
}

/// Parse the download table of an episode page.
#[must_use]
pub fn parse_download_set(html: &str) -> DownloadSet {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let heading = select_text(root, &DOWNLOAD_HEADING);
    let mut set = DownloadSet {
        title: strip_release_tags(&heading),
        ..DownloadSet::default()
    };

    for row in root.select(&DOWNLOAD_ROW) {
        let label = select_first(row, &STRONG).map(element_text).unwrap_or_default();
        if label.is_empty() {
            continue;
        }

        let links = row.select(&ANCHOR).map(download_source).collect();
        set.results.insert(resolution_key(&label), links);
        set.resolution_available.push(label);
    }

    set
}

/// Text after a leading `label` and its colon, with or without a space
/// before the colon.
fn strip_label(text: &str, label: &str) -> String {
    let text = text.trim();
    let rest = text.strip_prefix(label).unwrap_or(text).trim_start();
    clean_text(Some(rest.strip_prefix(':').unwrap_or(rest)))
}

fn download_source(anchor: ElementRef<'_>) -> DownloadSource {
    DownloadSource {
        source: element_text(anchor),
        link: anchor.value().attr("href").map(str::to_string),
    }
}

/// Drop "Subtitle Indonesia" and `[...]` tags from a download heading.
fn strip_release_tags(heading: &str) -> String {
    static SUBTITLE: Lazy<regex::Regex> =
        Lazy::new(|| regex::Regex::new(r"(?i)Subtitle Indonesia").expect("valid regex"));
    static BRACKETED: Lazy<regex::Regex> =
        Lazy::new(|| regex::Regex::new(r"\[.*?\]").expect("valid regex"));

    let stripped = SUBTITLE.replace_all(heading, "");
    BRACKETED.replace_all(&stripped, "").trim().to_string()
}

/// Parse the stream mirror lists of an episode page.
#[must_use]
pub fn parse_mirrors(html: &str) -> MirrorSet {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    MirrorSet {
        p360: mirror_entries(root, &MIRROR_360),
        p480: mirror_entries(root, &MIRROR_480),
        p720: mirror_entries(root, &MIRROR_720),
    }
}

fn mirror_entries(root: ElementRef<'_>, links: &Selector) -> Vec<MirrorEntry> {
    root.select(links)
        .map(|a| MirrorEntry {
            label: element_text(a),
            data_content: a
                .value()
                .attr("data-content")
                .map(|token| MirrorToken(token.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PLACEHOLDER_IMAGE;

    const GENRE_PAGE: &str = r#"
<html><body><div class="page">
  <div class="col-anime">
    <div class="col-anime-title"><a href="https://otakudesu.best/anime/kimetsu-sub-indo/">Kimetsu no Yaiba (Sub Indo)</a></div>
    <div class="col-anime-cover"><img data-src="https://cdn.example/kny.jpg" src="data:image/gif;base64,R0l"></div>
    <div class="col-anime-rating"> 8.51 </div>
    <div class="col-anime-eps">26 Eps</div>
  </div>
  <div class="col-anime">
    <div class="col-anime-title"><a>[Batch]</a></div>
  </div>
</div></body></html>"#;

    const KEYWORD_PAGE: &str = r#"
<html><body><ul class="chivsrc">
  <li>
    <img src="https://cdn.example/frieren.jpg">
    <h2><a href="https://otakudesu.best/anime/frieren-sub-indo/">Sousou no Frieren Subtitle Indonesia</a></h2>
    <div class="set"><b>Genres</b> : Adventure, Drama</div>
    <div class="set"><b>Status</b> : Completed</div>
    <div class="set"><b>Rating</b> : 9.10</div>
  </li>
</ul></body></html>"#;

    #[test]
    fn genre_grid_cards() {
        let entries = SearchLayout::GenreGrid.parse(GENRE_PAGE);
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title, "Kimetsu no Yaiba");
        assert_eq!(first.url, "https://otakudesu.best/anime/kimetsu-sub-indo/");
        assert_eq!(first.image, "https://cdn.example/kny.jpg");
        assert_eq!(first.rating.as_deref(), Some("8.51"));
        assert_eq!(first.episodes.as_deref(), Some("26 Eps"));
        assert!(first.status.is_none());

        // Tag-only title falls back to raw; missing fields default
        let second = &entries[1];
        assert_eq!(second.title, "[Batch]");
        assert_eq!(second.url, "");
        assert_eq!(second.image, PLACEHOLDER_IMAGE);
        assert_eq!(second.rating.as_deref(), Some(""));
    }

    #[test]
    fn keyword_list_reads_fact_rows() {
        let entries = SearchLayout::KeywordList.parse(KEYWORD_PAGE);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title, "Sousou no Frieren");
        assert_eq!(entry.status.as_deref(), Some("Completed"));
        assert_eq!(entry.rating.as_deref(), Some("9.10"));
        assert_eq!(entry.image, "https://cdn.example/frieren.jpg");
    }

    #[test]
    fn empty_page_yields_no_entries() {
        assert!(parse_genre_grid("<html></html>").is_empty());
        assert!(parse_keyword_list("").is_empty());
    }

    #[test]
    fn ongoing_entries() {
        let html = r#"
<div class="venz"><ul>
  <li>
    <div class="epz"><i></i> Episode 12.5</div>
    <div class="newnime">Sabtu</div>
    <a href="https://otakudesu.best/anime/dandadan-s2-sub-indo/"><img srcset="https://cdn.example/d.jpg 1x">
    <h2 class="jdlflm">Dandadan Season 2</h2></a>
  </li>
  <li><div class="epz">Batch</div><h2 class="jdlflm">Other</h2></li>
</ul></div>"#;
        let entries = parse_ongoing(html);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Dandadan Season 2");
        assert_eq!(entries[0].episode.as_deref(), Some("12.5"));
        assert_eq!(entries[0].released, "Sabtu");
        assert_eq!(entries[0].image, "https://cdn.example/d.jpg");
        assert_eq!(entries[0].url, "https://otakudesu.best/anime/dandadan-s2-sub-indo/");
        assert_eq!(entries[1].episode, None);
        assert_eq!(entries[1].url, "");
    }

    const DETAIL_PAGE: &str = r#"
<html><body>
<div class="fotoanime"><img src="https://cdn.example/cover.jpg"></div>
<div class="infozin"><div class="infozingle">
  <p><span><b>Judul</b>: Sousou no Frieren Subtitle Indonesia</span></p>
  <p><span><b>Skor</b>: 9.10</span></p>
  <p><span><b>Produser</b>: Aniplex, Dentsu</span></p>
  <p><span><b>Status</b>: Completed</span></p>
  <p><span><b>Total Episode</b>: 28</span></p>
  <p><span><b>Durasi</b>: 24 Menit</span></p>
  <p><span><b>Tanggal Rilis</b>: Sep 29, 2023</span></p>
  <p><span><b>Studio</b>: Madhouse</span></p>
  <p><span><b>Genre</b>: <a href="https://otakudesu.best/genres/adventure/">Adventure</a>, <a href="https://otakudesu.best/genres/drama/">Drama</a>, <a href="https://otakudesu.best/jadwal/">Jadwal</a></span></p>
</div></div>
<div class="sinopc"><p>First paragraph.</p><p> Second paragraph. </p></div>
<div class="episodelist"><ul>
  <li><span><a href="https://otakudesu.best/episode/frieren-episode-2-sub-indo/">Sousou no Frieren Episode 2 Subtitle Indonesia</a></span></li>
  <li><span><a href="https://otakudesu.best/episode/frieren-episode-1-sub-indo/">Sousou no Frieren Episode 1 Subtitle Indonesia</a></span></li>
  <li><span><a href="https://otakudesu.best/batch/frieren-batch/">Batch</a></span></li>
</ul></div>
</body></html>"#;

    #[test]
    fn anime_detail_info_table() {
        let detail = parse_anime(DETAIL_PAGE);
        assert_eq!(detail.title, "Sousou no Frieren");
        assert_eq!(detail.rating.as_deref(), Some("9.10"));
        assert_eq!(detail.status.as_deref(), Some("Completed"));
        assert_eq!(detail.metadata["produser"], "Aniplex, Dentsu");
        assert_eq!(detail.metadata["totalEpisode"], "28");
        assert_eq!(detail.metadata["duration"], "24 Menit");
        assert_eq!(detail.metadata["released"], "Sep 29, 2023");
        assert_eq!(detail.metadata["studio"], "Madhouse");
        assert_eq!(detail.synopsis, "First paragraph.\nSecond paragraph.");
        assert_eq!(detail.image, "https://cdn.example/cover.jpg");
        assert_eq!(detail.genres, vec!["Adventure", "Drama"]);
        assert!(detail.episodes.is_empty());
    }

    #[test]
    fn anime_detail_defaults() {
        let detail = parse_anime("<html><body></body></html>");
        assert_eq!(detail.synopsis, MISSING_SYNOPSIS);
        assert_eq!(detail.image, PLACEHOLDER_IMAGE);
        assert!(detail.rating.is_none());
        assert!(detail.genres.is_empty());
        assert!(detail.metadata.is_empty());
    }

    #[test]
    fn episode_list_filters_non_episode_links() {
        let list = parse_episodes(DETAIL_PAGE);
        assert_eq!(list.title.as_deref(), Some("Sousou no Frieren"));
        assert_eq!(list.episodes.len(), 2);
        assert_eq!(list.episodes[0].title, "Episode 2");
        assert_eq!(
            list.episodes[1].url,
            "https://otakudesu.best/episode/frieren-episode-1-sub-indo/"
        );
    }

    #[test]
    fn title_label_with_spaced_colon() {
        let list = parse_episodes("<p><span>Judul : Dandadan</span></p>");
        assert_eq!(list.title.as_deref(), Some("Dandadan"));
        assert!(list.episodes.is_empty());
    }

    #[test]
    fn episode_list_without_heading() {
        let list = parse_episodes(
            r#"<div class="episodelist"><ul><li><a href="/episode/x/">Special</a></li></ul></div>"#,
        );
        assert_eq!(list.title, None);
        assert_eq!(list.episodes[0].title, "Special");
    }

    #[test]
    fn download_table_groups_by_resolution() {
        let html = r#"
<div class="download">
  <h4>[Otakudesu] Frieren Episode 1 Subtitle Indonesia</h4>
  <ul>
    <li><strong>Mp4 360p</strong><a href="https://a.example/1">ODFiles</a> <a href="https://b.example/1">Pdrain</a><i>52 MB</i></li>
    <li><strong>Mp4 720p</strong><a>Mega</a></li>
    <li><strong> </strong><a href="https://c.example">ignored</a></li>
    <li><strong>MKV</strong><a href="https://d.example">KFiles</a></li>
  </ul>
</div>"#;
        let set = parse_download_set(html);
        assert_eq!(set.title, "Frieren Episode 1");
        assert_eq!(set.resolution_available, vec!["Mp4 360p", "Mp4 720p", "MKV"]);
        assert_eq!(set.results.len(), 3);
        assert_eq!(set.results["360p"].len(), 2);
        assert_eq!(set.results["360p"][1].source, "Pdrain");
        assert_eq!(set.results["720p"][0].link, None);
        assert_eq!(set.results["MKV"][0].link.as_deref(), Some("https://d.example"));
    }

    #[test]
    fn mirror_lists_by_quality() {
        let html = r##"
<div class="mirrorstream">
  <ul class="m360p"><li><a href="#" data-content="eyJpZCI6MX0="> ondesu </a></li></ul>
  <ul class="m480p"><li><a href="#" data-content="abc">odstream</a></li><li><a href="#">dead</a></li></ul>
</div>"##;
        let set = parse_mirrors(html);
        assert_eq!(set.p360.len(), 1);
        assert_eq!(set.p360[0].label, "ondesu");
        assert_eq!(set.p360[0].data_content, Some(MirrorToken("eyJpZCI6MX0=".to_string())));
        assert_eq!(set.p480.len(), 2);
        assert_eq!(set.p480[1].data_content, None);
        assert!(set.p720.is_empty());
    }
}
