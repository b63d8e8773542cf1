//! Page parsers for Samehadaku.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::extract::{
    element_text, elements_containing, resolve_image, select_attr, select_first, select_text,
    selector, RuleChain,
};
use crate::model::{
    AnimeDetail, CatalogEntry, DownloadLink, EpisodeDetail, EpisodeRef, LatestEntry,
    ScheduleDay, ScheduleEntry, ServerDescriptor, TopTenEntry,
};

/// Schedule tabs in page order.
pub const SCHEDULE_DAYS: &[&str] = &[
    "senin", "selasa", "rabu", "kamis", "jumat", "sabtu", "minggu",
];

const UNKNOWN_RATING: &str = "?";
const UNKNOWN_STATUS: &str = "Unknown";

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static SPAN: Lazy<Selector> = Lazy::new(|| selector("span"));
static STRONG: Lazy<Selector> = Lazy::new(|| selector("strong"));
static AUTHOR: Lazy<Selector> = Lazy::new(|| selector("author"));
static THUMB_IMG: Lazy<Selector> = Lazy::new(|| selector(".thumb img"));
static ENTRY_TITLE: Lazy<Selector> = Lazy::new(|| selector("h1.entry-title"));

static TOP_TEN_ITEM: Lazy<Selector> = Lazy::new(|| selector(".topten-animesu ul li"));
static TOP_TEN_TITLE: Lazy<Selector> = Lazy::new(|| selector(".judul"));
static TOP_TEN_LINK: Lazy<Selector> = Lazy::new(|| selector("a.series"));
static TOP_TEN_RATING: Lazy<Selector> = Lazy::new(|| selector(".rating"));
static TOP_TEN_RANK: Lazy<Selector> = Lazy::new(|| selector(".is-topten b"));

static LATEST_ITEM: Lazy<Selector> = Lazy::new(|| selector(".post-show ul li"));
static LATEST_TITLE: Lazy<Selector> = Lazy::new(|| selector(".entry-title a"));
static LATEST_POSTER: Lazy<Selector> = Lazy::new(|| selector("span.author.vcard author"));

static CARD: Lazy<Selector> = Lazy::new(|| selector(".animpost"));
static CARD_TITLE: Lazy<Selector> = Lazy::new(|| selector(".title h2"));
static CARD_IMG: Lazy<Selector> = Lazy::new(|| selector(".content-thumb img"));
static CARD_TYPE: Lazy<Selector> = Lazy::new(|| selector(".content-thumb .type"));
static CARD_STATUS: Lazy<Selector> = Lazy::new(|| selector(".data .type"));
static CARD_SYNOPSIS: Lazy<Selector> = Lazy::new(|| selector(".stooltip .ttls"));
static CARD_GENRE: Lazy<Selector> = Lazy::new(|| selector(".stooltip .genres .mta a"));
static CARD_RATING: Lazy<RuleChain> =
    Lazy::new(|| RuleChain::text(&[".score", ".content-thumb .score"]));

static DETAIL_RATING: Lazy<RuleChain> = Lazy::new(|| {
    RuleChain::text(&[".rtg .skor", ".rating strong", "span[itemprop='ratingValue']"])
});
static DETAIL_SYNOPSIS: Lazy<RuleChain> =
    Lazy::new(|| RuleChain::text(&[".desc", ".entry-content"]));
static DETAIL_FACT: Lazy<Selector> = Lazy::new(|| selector(".spe span"));
static DETAIL_GENRE: Lazy<Selector> = Lazy::new(|| selector(".genre-info a"));
static DETAIL_EPISODE: Lazy<Selector> = Lazy::new(|| selector(".lstepsiode ul li"));
static DETAIL_EPISODE_LINK: Lazy<Selector> = Lazy::new(|| selector(".lchx a"));
static DETAIL_EPISODE_DATE: Lazy<Selector> = Lazy::new(|| selector(".date"));

static POSTED_AT: Lazy<Selector> = Lazy::new(|| selector(".time-post"));
static NAV_PREV: Lazy<Selector> = Lazy::new(|| selector(".nvs a[href]"));
static NAV_NEXT: Lazy<Selector> = Lazy::new(|| selector(".nvs.rght a[href]"));
static NAV_ALL: Lazy<Selector> = Lazy::new(|| selector(".nvs.nvsc a[href]"));
static DOWNLOAD_BLOCK: Lazy<Selector> = Lazy::new(|| selector(".download-eps"));
static DOWNLOAD_FORMAT: Lazy<Selector> = Lazy::new(|| selector("p"));
static DOWNLOAD_ROW: Lazy<Selector> = Lazy::new(|| selector("ul li"));
static DOWNLOAD_LINK: Lazy<Selector> = Lazy::new(|| selector("span a"));
static SERVER: Lazy<Selector> = Lazy::new(|| selector("#server ul li div"));
static PLAYER_IFRAME: Lazy<Selector> = Lazy::new(|| selector("iframe[src]"));

static SCHEDULE_ITEM: Lazy<Selector> = Lazy::new(|| selector(".items .item"));
static SCHEDULE_NAME: Lazy<Selector> = Lazy::new(|| selector(".name"));
static SCHEDULE_TIME: Lazy<Selector> = Lazy::new(|| selector(".time"));

/// An episode page before its player servers are resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodePage {
    /// Everything except `stream_servers`, which is left empty.
    pub detail: EpisodeDetail,
    pub servers: Vec<ServerDescriptor>,
}

/// Parse the weekly top-ten block of the front page.
#[must_use]
pub fn parse_top_ten(html: &str) -> Vec<TopTenEntry> {
    let doc = Html::parse_document(html);
    doc.select(&TOP_TEN_ITEM)
        .map(|item| TopTenEntry {
            title: select_text(item, &TOP_TEN_TITLE),
            url: select_attr(item, &TOP_TEN_LINK, "href").unwrap_or_default(),
            image: resolve_image(select_first(item, &IMG)),
            rating: or_unknown(select_text(item, &TOP_TEN_RATING)),
            rank: item
                .select(&TOP_TEN_RANK)
                .last()
                .map(element_text)
                .unwrap_or_default(),
        })
        .collect()
}

/// Parse one page of the latest-release listing.
#[must_use]
pub fn parse_latest(html: &str) -> Vec<LatestEntry> {
    let doc = Html::parse_document(html);
    doc.select(&LATEST_ITEM)
        .map(|item| {
            let released: String = elements_containing(item, &SPAN, "Released on")
                .flat_map(|span| span.text())
                .collect();

            LatestEntry {
                title: select_text(item, &LATEST_TITLE),
                url: select_attr(item, &LATEST_TITLE, "href").unwrap_or_default(),
                image: resolve_image(select_first(item, &THUMB_IMG)),
                episode: episode_author(item),
                posted_by: select_text(item, &LATEST_POSTER),
                released: released.replacen("Released on:", "", 1).trim().to_string(),
            }
        })
        .collect()
}

/// Text of the `<author>` tags sitting inside an "Episode" span.
fn episode_author(item: ElementRef<'_>) -> String {
    let text: String = item
        .select(&AUTHOR)
        .filter(|author| {
            author
                .ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|el| el.id() != item.id())
                .any(|el| el.value().name() == "span" && element_text(el).contains("Episode"))
        })
        .flat_map(|author| author.text())
        .collect();
    text.trim().to_string()
}

/// Parse an advanced-search result page.
#[must_use]
pub fn parse_search(html: &str) -> Vec<CatalogEntry> {
    let doc = Html::parse_document(html);
    doc.select(&CARD)
        .map(|card| CatalogEntry {
            title: select_text(card, &CARD_TITLE),
            url: select_attr(card, &ANCHOR, "href").unwrap_or_default(),
            image: resolve_image(select_first(card, &CARD_IMG)),
            rating: Some(CARD_RATING.first_or(card, UNKNOWN_RATING)),
            kind: Some(select_text(card, &CARD_TYPE)),
            status: Some(select_text(card, &CARD_STATUS)),
            synopsis: Some(select_text(card, &CARD_SYNOPSIS)),
            episodes: None,
            genres: card.select(&CARD_GENRE).map(element_text).collect(),
        })
        .collect()
}

/// Parse a series detail page, episode list included.
#[must_use]
pub fn parse_anime(html: &str) -> AnimeDetail {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let mut detail = AnimeDetail {
        title: select_text(root, &ENTRY_TITLE),
        image: resolve_image(select_first(root, &THUMB_IMG)),
        rating: Some(DETAIL_RATING.first_or(root, UNKNOWN_RATING)),
        synopsis: DETAIL_SYNOPSIS.first_or(root, ""),
        status: Some(UNKNOWN_STATUS.to_string()),
        ..AnimeDetail::default()
    };

    for fact in root.select(&DETAIL_FACT) {
        let text: String = fact.text().collect();

        if text.to_lowercase().contains("status") {
            detail.status = Some(strip_status_label(&text));
        }

        if let Some((key, value)) = text.split_once(':') {
            let key = metadata_key(key);
            let value = value.trim();
            if !key.is_empty() && !value.is_empty() {
                detail.insert_metadata(key, value);
            }
        }
    }

    detail.genres = root.select(&DETAIL_GENRE).map(element_text).collect();

    detail.episodes = root
        .select(&DETAIL_EPISODE)
        .map(|li| EpisodeRef {
            title: select_text(li, &DETAIL_EPISODE_LINK),
            url: select_attr(li, &DETAIL_EPISODE_LINK, "href").unwrap_or_default(),
            date: Some(select_text(li, &DETAIL_EPISODE_DATE)),
        })
        .collect();

    detail.insert_metadata("total_episodes", detail.episodes.len().to_string());
    detail
}

/// "Status: Ongoing" → "Ongoing", matching the label case-insensitively.
fn strip_status_label(text: &str) -> String {
    static STATUS_LABEL: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)status").expect("valid regex"));
    STATUS_LABEL.replace(text, "").replacen(':', "", 1).trim().to_string()
}

/// "Tanggal Rilis " → "tanggal_rilis".
fn metadata_key(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Parse an episode page.
#[must_use]
pub fn parse_episode(html: &str) -> EpisodePage {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    let posted = select_text(root, &POSTED_AT);
    let detail = EpisodeDetail {
        title: select_text(root, &ENTRY_TITLE),
        release_date: posted.replacen("Posted by", "", 1).trim().to_string(),
        prev_episode: nav_link(root, &NAV_PREV),
        next_episode: nav_link(root, &NAV_NEXT),
        all_episodes_link: nav_link(root, &NAV_ALL),
        downloads: parse_downloads(root),
        stream_servers: Vec::new(),
    };

    let servers = root
        .select(&SERVER)
        .map(|div| {
            let attr = |name: &str| div.value().attr(name).map(str::to_string);
            ServerDescriptor {
                name: select_text(div, &SPAN),
                post: attr("data-post"),
                nume: attr("data-nume"),
                kind: attr("data-type"),
            }
        })
        .collect();

    EpisodePage { detail, servers }
}

fn nav_link(root: ElementRef<'_>, links: &Selector) -> Option<String> {
    select_attr(root, links, "href").filter(|href| !href.is_empty())
}

fn parse_downloads(root: ElementRef<'_>) -> Vec<DownloadLink> {
    let mut downloads = Vec::new();
    for block in root.select(&DOWNLOAD_BLOCK) {
        let format = select_text(block, &DOWNLOAD_FORMAT);
        for row in block.select(&DOWNLOAD_ROW) {
            let resolution = select_text(row, &STRONG);
            downloads.extend(row.select(&DOWNLOAD_LINK).map(|a| DownloadLink {
                format: format.clone(),
                resolution: resolution.clone(),
                server: element_text(a),
                url: a.value().attr("href").map(str::to_string),
            }));
        }
    }
    downloads
}

/// Player URL inside a `player_ajax` reply fragment.
#[must_use]
pub fn parse_player_iframe(fragment: &str) -> Option<String> {
    let doc = Html::parse_fragment(fragment);
    select_attr(doc.root_element(), &PLAYER_IFRAME, "src").filter(|src| !src.trim().is_empty())
}

/// Parse the release schedule page. Days without releases are skipped.
#[must_use]
pub fn parse_schedule(html: &str) -> Vec<ScheduleDay> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();

    SCHEDULE_DAYS
        .iter()
        .filter_map(|day| {
            let container = select_first(root, &selector(&format!("#{day}")))?;
            let list: Vec<ScheduleEntry> = container
                .select(&SCHEDULE_ITEM)
                .map(|item| ScheduleEntry {
                    title: select_text(item, &SCHEDULE_NAME),
                    url: select_attr(item, &SCHEDULE_NAME, "href").unwrap_or_default(),
                    time: select_text(item, &SCHEDULE_TIME),
                    image: resolve_image(select_first(item, &THUMB_IMG)),
                    genres: Vec::new(),
                })
                .collect();

            (!list.is_empty()).then(|| ScheduleDay {
                day: day.to_uppercase(),
                list,
            })
        })
        .collect()
}

fn or_unknown(text: String) -> String {
    if text.is_empty() {
        UNKNOWN_RATING.to_string()
    } else {
        text
    }
}
