//! `anisrc` - Anime source scraper
//!
//! # Features
//!
//! - **Two sources**: Otakudesu (catalog, downloads, stream mirrors) and
//!   Samehadaku (listings, schedule, player servers)
//! - **Typed records**: every page is normalized into serde-serializable structs
//! - **Stream resolution**: mirror tokens and player servers resolve to iframe URLs
//! - **Browser Fingerprinting**: Realistic Chrome/Firefox/Safari header profiles,
//!   rotated on every request
//! - **Forgiving**: operations never fail; errors are logged and replaced by
//!   empty results
//!
//! # Example
//!
//! ```rust,no_run
//! use anisrc::{Config, Otakudesu, SearchOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let otakudesu = Otakudesu::new(&config.otakudesu, config.fingerprint.clone())?;
//!
//!     for entry in otakudesu.search("frieren", 1, &SearchOptions::default()).await {
//!         println!("{} -> {}", entry.title, entry.url);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod extract;
pub mod fingerprint;
pub mod http_client;
pub mod model;
pub mod source;

pub use config::{Config, OtakudesuConfig, SourceConfig};
pub use error::{Result, ScrapeError};
pub use fingerprint::{
    chrome_profile, firefox_profile, random_profile, safari_profile, BrowserProfile,
    FingerprintOptions,
};
pub use http_client::{Page, SourceClient};
pub use model::*;
pub use source::otakudesu::{Otakudesu, SearchOptions};
pub use source::samehadaku::{Samehadaku, SearchFilter};
pub use source::SourceKind;

/// Version of anisrc
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
