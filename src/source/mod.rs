//! Source adapters.
//!
//! One adapter per site. Each owns the [`SourceClient`](crate::SourceClient)
//! it was built with and exposes infallible operations: failures are logged
//! and turned into the operation's neutral value (`[]`, `None`, a default
//! record).
//!
//! # Example
//!
//! ```rust,no_run
//! use anisrc::{Config, Samehadaku};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let samehadaku = Samehadaku::new(&config.samehadaku, config.fingerprint.clone())?;
//!
//! for day in samehadaku.schedule().await {
//!     println!("{}: {} releases", day.day, day.list.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod otakudesu;
pub mod samehadaku;

use std::fmt;

use crate::config::Config;
use crate::error::Result;

/// Which adapter handles a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Otakudesu,
    Samehadaku,
}

impl SourceKind {
    /// Short name used in logs and on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Otakudesu => "otakudesu",
            Self::Samehadaku => "samehadaku",
        }
    }

    /// Map a canonical page URL to the source that serves it.
    ///
    /// Matches on the configured origins, so overridden base URLs route too.
    #[must_use]
    pub fn detect(url: &str, config: &Config) -> Option<Self> {
        let url = url.trim();
        if starts_with_origin(url, config.otakudesu.source.origin()) {
            Some(Self::Otakudesu)
        } else if starts_with_origin(url, config.samehadaku.origin()) {
            Some(Self::Samehadaku)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unwrap an operation result, logging the error and substituting `fallback`.
pub(crate) fn recover<T>(
    source: SourceKind,
    operation: &'static str,
    input: &str,
    result: Result<T>,
    fallback: impl FnOnce() -> T,
) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(source = %source, operation, input, error = %e, "Scrape failed");
        fallback()
    })
}

/// `url` is the origin itself or a path below it.
fn starts_with_origin(url: &str, origin: &str) -> bool {
    !origin.is_empty()
        && url
            .strip_prefix(origin)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_default_origins() {
        let config = Config::default();
        assert_eq!(
            SourceKind::detect("https://otakudesu.best/anime/frieren-sub-indo/", &config),
            Some(SourceKind::Otakudesu)
        );
        assert_eq!(
            SourceKind::detect("https://v1.samehadaku.how/anime/frieren/", &config),
            Some(SourceKind::Samehadaku)
        );
        assert_eq!(SourceKind::detect("https://example.com/anime/x/", &config), None);
    }

    #[test]
    fn origin_prefix_must_end_at_host_boundary() {
        let config = Config::default();
        assert_eq!(SourceKind::detect("https://otakudesu.best.evil.com/anime/", &config), None);
        assert_eq!(
            SourceKind::detect("https://otakudesu.best", &config),
            Some(SourceKind::Otakudesu)
        );
    }

    #[test]
    fn recover_substitutes_fallback() {
        let failed: Result<Vec<u8>> = Err(crate::error::ScrapeError::MissingField("data"));
        assert!(recover(SourceKind::Otakudesu, "test", "x", failed, Vec::new).is_empty());
        assert_eq!(recover(SourceKind::Otakudesu, "test", "x", Ok(vec![1]), Vec::new), vec![1]);
    }

    #[test]
    fn detects_overridden_origin() {
        let mut config = Config::default();
        config.samehadaku.base_url = "http://127.0.0.1:8080/".to_string();
        assert_eq!(
            SourceKind::detect("http://127.0.0.1:8080/episode/x/", &config),
            Some(SourceKind::Samehadaku)
        );
        assert_eq!(SourceKind::Samehadaku.to_string(), "samehadaku");
    }
}
