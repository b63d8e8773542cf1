//! Normalized records produced by the source adapters.
//!
//! Field names serialize to the JSON shape the public API has always served,
//! which is why some records use camelCase and others snake_case.

use std::collections::BTreeMap;

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::{DecodePaddingMode, Engine as _};
use base64::alphabet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScrapeError};

/// Standard-alphabet base64 that tolerates missing or present padding.
pub(crate) const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One search or listing hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub title: String,
    pub url: String,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    pub genres: Vec<String>,
}

/// Otakudesu ongoing-listing entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OngoingEntry {
    pub title: String,
    pub image: String,
    pub url: String,
    /// Latest episode number, decimals allowed ("12.5").
    pub episode: Option<String>,
    pub released: String,
}

/// Samehadaku weekly top-ten entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TopTenEntry {
    pub title: String,
    pub url: String,
    pub image: String,
    pub rating: String,
    pub rank: String,
}

/// Samehadaku latest-release entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestEntry {
    pub title: String,
    pub url: String,
    pub image: String,
    pub episode: String,
    pub posted_by: String,
    pub released: String,
}

/// Full detail page of one series.
///
/// `metadata` carries the source-specific labels (producer, studio, duration,
/// ...) and is flattened into the JSON object next to the typed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnimeDetail {
    pub title: String,
    pub image: String,
    pub synopsis: String,
    pub rating: Option<String>,
    pub status: Option<String>,
    pub genres: Vec<String>,
    pub episodes: Vec<EpisodeRef>,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, String>,
}

impl AnimeDetail {
    /// Keys owned by typed fields; never stored in `metadata`.
    pub const RESERVED_KEYS: &'static [&'static str] = &[
        "title", "image", "synopsis", "rating", "status", "genres", "episodes",
    ];

    /// Insert a metadata pair unless the key belongs to a typed field.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if !Self::RESERVED_KEYS.contains(&key.as_str()) {
            self.metadata.insert(key, value.into());
        }
    }
}

/// Link to one episode page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeRef {
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Otakudesu episode listing of one series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeList {
    pub title: Option<String>,
    pub episodes: Vec<EpisodeRef>,
}

/// One download mirror inside a resolution group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadSource {
    pub source: String,
    pub link: Option<String>,
}

/// Otakudesu download table of one episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadSet {
    pub title: String,
    pub resolution_available: Vec<String>,
    pub results: BTreeMap<String, Vec<DownloadSource>>,
}

/// Opaque base64 envelope naming one Otakudesu stream mirror.
///
/// The value is session-bound upstream; resolve it right away instead of
/// storing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MirrorToken(pub String);

/// Decoded content of a [`MirrorToken`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRef {
    pub id: String,
    pub i: String,
    pub q: String,
}

impl MirrorToken {
    /// Decode the base64 JSON envelope into its `{id, i, q}` triple.
    pub fn decode(&self) -> Result<MirrorRef> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return Err(ScrapeError::InvalidToken("empty token".to_string()));
        }

        let bytes = LENIENT_BASE64.decode(raw)?;
        let envelope: Value = serde_json::from_slice(&bytes)?;

        Ok(MirrorRef {
            id: scalar(&envelope, "id")?,
            i: scalar(&envelope, "i")?,
            q: scalar(&envelope, "q")?,
        })
    }
}

/// Read a string or number field as text.
fn scalar(envelope: &Value, field: &'static str) -> Result<String> {
    match envelope.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ScrapeError::MissingField(field)),
    }
}

/// One labelled stream mirror on an Otakudesu episode page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorEntry {
    pub label: String,
    pub data_content: Option<MirrorToken>,
}

/// Stream mirrors grouped by resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MirrorSet {
    #[serde(rename = "360p")]
    pub p360: Vec<MirrorEntry>,
    #[serde(rename = "480p")]
    pub p480: Vec<MirrorEntry>,
    #[serde(rename = "720p")]
    pub p720: Vec<MirrorEntry>,
}

/// Result of resolving one mirror token. `None` means "mirror unavailable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VideoEmbed {
    pub iframe: Option<String>,
}

/// One row of a Samehadaku download table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DownloadLink {
    pub format: String,
    pub resolution: String,
    pub server: String,
    pub url: Option<String>,
}

/// Samehadaku player server as embedded in the episode page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub name: String,
    pub post: Option<String>,
    pub nume: Option<String>,
    pub kind: Option<String>,
}

impl ServerDescriptor {
    /// The `{post, nume, type}` triple, when all three attributes are present.
    #[must_use]
    pub fn triple(&self) -> Option<(&str, &str, &str)> {
        Some((self.post.as_deref()?, self.nume.as_deref()?, self.kind.as_deref()?))
    }
}

/// A resolved player server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamServer {
    pub server: String,
    pub iframe: Option<String>,
}

/// Samehadaku episode page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeDetail {
    pub title: String,
    pub release_date: String,
    pub prev_episode: Option<String>,
    pub next_episode: Option<String>,
    pub all_episodes_link: Option<String>,
    pub downloads: Vec<DownloadLink>,
    pub stream_servers: Vec<StreamServer>,
}

/// One slot of the release schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub title: String,
    pub url: String,
    pub time: String,
    pub image: String,
    pub genres: Vec<String>,
}

/// All releases of one weekday.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScheduleDay {
    pub day: String,
    pub list: Vec<ScheduleEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;

    fn token(json: &str) -> MirrorToken {
        MirrorToken(STANDARD.encode(json))
    }

    #[test]
    fn decodes_numeric_envelope() {
        let decoded = token(r#"{"id":170457,"i":0,"q":"480p"}"#).decode().unwrap();
        assert_eq!(
            decoded,
            MirrorRef {
                id: "170457".to_string(),
                i: "0".to_string(),
                q: "480p".to_string(),
            }
        );
    }

    #[test]
    fn decodes_unpadded_token() {
        let padded = STANDARD.encode(r#"{"id":"1","i":"2","q":"720p"}"#);
        let unpadded = MirrorToken(padded.trim_end_matches('=').to_string());
        assert_eq!(unpadded.decode().unwrap().q, "720p");
    }

    #[test]
    fn rejects_non_base64_token() {
        let err = MirrorToken("%%%not base64%%%".to_string()).decode().unwrap_err();
        assert!(matches!(err, ScrapeError::Base64(_)));
    }

    #[test]
    fn rejects_base64_that_is_not_json() {
        let err = token("hello world").decode().unwrap_err();
        assert!(matches!(err, ScrapeError::Json(_)));
    }

    #[test]
    fn rejects_envelope_missing_quality() {
        let err = token(r#"{"id":1,"i":0}"#).decode().unwrap_err();
        assert!(matches!(err, ScrapeError::MissingField("q")));
    }

    #[test]
    fn rejects_empty_token() {
        let err = MirrorToken("  ".to_string()).decode().unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidToken(_)));
    }

    #[test]
    fn metadata_flattens_next_to_typed_fields() {
        let mut detail = AnimeDetail {
            title: "Frieren".to_string(),
            ..AnimeDetail::default()
        };
        detail.insert_metadata("studio", "Madhouse");
        detail.insert_metadata("status", "Ongoing");

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["studio"], "Madhouse");
        assert_eq!(json["status"], Value::Null);
        assert!(json["genres"].as_array().unwrap().is_empty());
    }

    #[test]
    fn catalog_entry_always_carries_genres() {
        let json = serde_json::to_value(CatalogEntry::default()).unwrap();
        assert_eq!(json["genres"], serde_json::json!([]));
        assert!(json.get("rating").is_none());
    }

    #[test]
    fn mirror_set_uses_resolution_keys() {
        let json = serde_json::to_value(MirrorSet::default()).unwrap();
        assert!(json.get("360p").is_some());
        assert!(json.get("480p").is_some());
        assert!(json.get("720p").is_some());
    }

    #[test]
    fn descriptor_triple_requires_all_attributes() {
        let mut server = ServerDescriptor {
            name: "Nakama".to_string(),
            post: Some("1".to_string()),
            nume: Some("2".to_string()),
            kind: None,
        };
        assert!(server.triple().is_none());
        server.kind = Some("schtml".to_string());
        assert_eq!(server.triple(), Some(("1", "2", "schtml")));
    }
}
