//! Field extraction toolkit shared by both adapters.
//!
//! The helpers follow jQuery-style semantics because both sites were built
//! around them: the text of a selection is the concatenated text of every
//! match, while an attribute is read from the first match only.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// Gray "NO SIGNAL" SVG returned when a record has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iMzAwIiBoZWlnaHQ9IjQ1MCIgdmlld0JveD0iMCAwIDMwMCA0NTAiIGZpbGw9Im5vbmUiIHhtbG5zPSJodHRwOi8vd3d3LnczLm9yZy8yMDAwL3N2ZyI+CjxkZWZzPgo8bGluZWFyR3JhZGllbnQgaWQ9InBhaW50MF9saW5ZWFIiIHgxPSIwIiB5MT0iMCIgeDI9IjMwMCIgeTI9IjQ1MCIgZ3JhZGllbnRVbml0cz0idXNlclNwYWNlT25Vc2UiPgo8c3RvcCBzdG9wLWNvbG9yPSIjMUExQTIwIi8+CjxzdG9wIG9mZnNldD0iMSIgc3RvcC1jb2xvcj0iIzBGMEYxMiIvPgo8L2xpbmVhckdyYWRpZW50Pgo8bGluZWFyR3JhZGllbnQgaWQ9InBhaW50MV9saW5ZWFIiIHgxPSIxNTAiIHkxPSIxODAiIHgyPSIxNTAiIHkyPSIyNzAiIGdyYWRpZW50VW5pdHM9InVzZXJTcGFjZU9uVXNlIj4KPHN0b3Agc3RvcC1jb2xvcj0iI0ZGNDc1NyIvPgo8c3RvcCBvZmZzZXQ9IjEiIHN0b3AtY29sb3I9IiNFMzNBNEIiLz4KPC9saW5ZWFJHcmFkaWVudD4KPC9kZWZzPgo8cmVjdCB3aWR0aD0iMzAwIiBoZWlnaHQ9IjQ1MCIgZmlsbD0idXJsKCNwYWludDBfbGluWUFSKSIvPgo8cGF0aCBkPSJNMTUwIDIyNUwxMzAgMjA1SDE3MEwxNTAgMjI1WiIgZmlsbD0idXJsKCNwYWludDFfbGluWUFSKSIvPgo8cGF0aCBmaWxsLXJ1bGU9ImV2ZW5vZGQiIGNsaXAtcnVsZT0iZXZlbm9kZCIgZD0iTTE1MCAxNTBDMTMwLjY3IDE1MCAxMTUgMTY1LjY3IDExNSAxODVWMTkwQzExNSAxOTIuNzYxIDExMi43NjEgMTk1IDExMCAxOTVWMTg1QzExMCAxNjIuOTA5IDEyNy45MDkgMTQ1IDE1MCAxNDVDMTcyLjA5MSAxNDUgMTkwIDE2Mi45MDkgMTkwIDE4NVYxOTVDMTg3LjIzOSAxOTUgMTkwIDE5Mi43NjEgMTkwIDE5MFYxODVDMTkwIDE2NS42NyAxNzQuMzMgMTUwIDE1MCAxNTBaTTEzNSAybDMwVzEzNSAybDIwQzEzNSAyMTcuMjM5IDEzMi43NjEgMjE1IDEzMCAyMTVWMjMwQzEzMi43NjEgMjMwIDEzNSAyMzIuMjM5IDEzNSAyMzVWMTkwWiIgZmlsbD0iIzMzMzMzMyIvPgo8Y2lyY2xlIGN4PSIxNTAiIGN5PSIxNTAiIHI9IjUiIGZpbGw9IiNGRjQ3NTciLz4KPHRleHQgeD0iMTUwIiB5PSIyNzAiIGZpbGw9IiM2NjY2NjYiIGZvbnQtZmFtaWx5PSJzYW5zLXNlcmlmIiBmb250LXdlaWdodD0iNjAwIiBmb250LXNpemU9IjE0IiB0ZXh0LWFuY2hvcj0ibWlkZGxlIiBsZXR0ZXItc3BhY2luZz0iMiI+Tk8gU0lHTkFMPC90ZXh0Pgo8L3N2Zz4=";

/// Inline 1x1 GIF that lazy-loading themes put in `src` before the real image loads.
const LAZY_GIF_MARKER: &str = "data:image/gif";

/// Image attributes in lookup order. `srcset` contributes its first URL.
const IMAGE_ATTRIBUTES: &[&str] = &["data-src", "data-lazy-src", "srcset", "src"];

static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));
static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));
static SUBTITLE_INDONESIA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Subtitle Indonesia").expect("valid regex"));
static EPISODE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Episode\s+\d+").expect("valid regex"));
static TRAILING_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*$").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static EPISODE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Episode\s+(\d+(\.\d+)?)").expect("valid regex"));

/// Compile a selector literal.
///
/// Only called with selectors written in this crate, all of which are
/// exercised by the parser tests, so a parse failure is a programming error.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Trim, mapping an absent value to `""`.
#[must_use]
pub fn clean_text(text: Option<&str>) -> String {
    text.map(str::trim).unwrap_or_default().to_string()
}

/// Concatenated text of an element and its descendants, trimmed.
#[must_use]
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Concatenated, trimmed text of every element matching `selector` under `scope`.
#[must_use]
pub fn select_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .flat_map(|el| el.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// First element matching `selector` under `scope`.
#[must_use]
pub fn select_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Attribute of the first element matching `selector`.
#[must_use]
pub fn select_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    select_first(scope, selector)
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

/// Elements matching `selector` whose text contains `needle`.
///
/// Stands in for jQuery's `:contains()`, which CSS selectors lack.
pub fn elements_containing<'a>(
    scope: ElementRef<'a>,
    selector: &'a Selector,
    needle: &'a str,
) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    scope
        .select(selector)
        .filter(move |el| el.text().collect::<String>().contains(needle))
}

/// Best image URL of an `<img>` element, or [`PLACEHOLDER_IMAGE`].
///
/// Never returns an empty string.
#[must_use]
pub fn resolve_image(img: Option<ElementRef<'_>>) -> String {
    let Some(img) = img else {
        return PLACEHOLDER_IMAGE.to_string();
    };

    // The first attribute present wins, even if it turns out unusable
    let candidate = IMAGE_ATTRIBUTES.iter().find_map(|attr| {
        let value = img.value().attr(attr)?;
        if *attr == "srcset" {
            value.split(' ').next().filter(|v| !v.is_empty())
        } else {
            Some(value).filter(|v| !v.is_empty())
        }
    });

    match candidate.map(str::trim) {
        Some(url) if !url.is_empty() && !url.contains(LAZY_GIF_MARKER) => url.to_string(),
        _ => PLACEHOLDER_IMAGE.to_string(),
    }
}

/// Strip site branding and episode noise from a series title.
///
/// Removes `[...]` tags, `(...)` notes, "Subtitle Indonesia", "Episode N",
/// a trailing dash, and collapses whitespace. May return `""`; see
/// [`title_or_raw`].
#[must_use]
pub fn clean_title(text: Option<&str>) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return String::new();
    };

    let cleaned = BRACKETED.replace_all(text, "");
    let cleaned = PARENTHESIZED.replace_all(&cleaned, "");
    let cleaned = SUBTITLE_INDONESIA.replace_all(&cleaned, "");
    let cleaned = EPISODE_SUFFIX.replace_all(&cleaned, "");
    let cleaned = TRAILING_DASH.replace(&cleaned, "");
    let cleaned = WHITESPACE.replace_all(&cleaned, " ");
    cleaned.trim().to_string()
}

/// Cleaned title, or the raw one when cleaning leaves nothing.
#[must_use]
pub fn title_or_raw(raw: &str) -> String {
    let cleaned = clean_title(Some(raw));
    if cleaned.is_empty() {
        raw.to_string()
    } else {
        cleaned
    }
}

/// Episode number from an "Episode 12" / "episode 12.5" label.
#[must_use]
pub fn episode_number(text: &str) -> Option<String> {
    EPISODE_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalize an episode link label to "Episode N", or keep it unchanged.
#[must_use]
pub fn episode_title(raw: &str) -> String {
    match episode_number(raw) {
        Some(number) => format!("Episode {number}"),
        None => raw.to_string(),
    }
}

/// Key of a download resolution group: "MP4 480p" → "480p".
///
/// Labels without a second space-separated token are used whole.
#[must_use]
pub fn resolution_key(label: &str) -> String {
    label
        .split(' ')
        .nth(1)
        .filter(|token| !token.is_empty())
        .unwrap_or(label)
        .to_string()
}

/// How a [`Rule`] turns a matched element into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    /// Concatenated text of every match.
    Text,
    /// Named attribute of the first match.
    Attr(&'static str),
}

/// One candidate location for a field.
#[derive(Debug)]
pub struct Rule {
    selector: Selector,
    extractor: Extractor,
}

/// Ordered fallback locations for one field; the first non-empty value wins.
///
/// Used where a site renders the same field in different places depending on
/// the page template.
#[derive(Debug)]
pub struct RuleChain {
    rules: Vec<Rule>,
}

impl RuleChain {
    #[must_use]
    pub fn new(candidates: &[(&str, Extractor)]) -> Self {
        let rules = candidates
            .iter()
            .map(|(css, extractor)| Rule {
                selector: selector(css),
                extractor: *extractor,
            })
            .collect();
        Self { rules }
    }

    /// Shorthand for a chain of text-only rules.
    #[must_use]
    pub fn text(selectors: &[&str]) -> Self {
        let candidates: Vec<(&str, Extractor)> =
            selectors.iter().map(|css| (*css, Extractor::Text)).collect();
        Self::new(&candidates)
    }

    /// First non-empty trimmed value across the rules, in order.
    #[must_use]
    pub fn first_match(&self, scope: ElementRef<'_>) -> Option<String> {
        self.rules.iter().find_map(|rule| {
            let value = match rule.extractor {
                Extractor::Text => select_text(scope, &rule.selector),
                Extractor::Attr(name) => {
                    clean_text(select_attr(scope, &rule.selector, name).as_deref())
                }
            };
            Some(value).filter(|v| !v.is_empty())
        })
    }

    /// [`first_match`](Self::first_match) with a fixed default.
    #[must_use]
    pub fn first_or(&self, scope: ElementRef<'_>, default: &str) -> String {
        self.first_match(scope).unwrap_or_else(|| default.to_string())
    }
}
