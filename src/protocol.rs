//! Wire types for the remote signage configuration endpoint.
//!
//! The backend replies to `GET /signage/config?deviceId=...` with a JSON
//! record in which every field is optional. Decoding is deliberately lenient
//! *per field*: a field that is present but ill-typed decodes to `None` and is
//! ignored by the merge, without poisoning the rest of the document. Only a
//! body that is not valid JSON at all fails the parse.
//!
//! `deviceId`, `exists`, and `updatedAt` are kept even though the merge does
//! not read them, for protocol completeness.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Top-level configuration record from the signage backend.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RemoteConfig {
    #[serde(default, rename = "deviceId", deserialize_with = "lenient_string")]
    pub device_id: Option<String>,

    #[serde(default, deserialize_with = "lenient_bool")]
    pub exists: Option<bool>,

    #[serde(default, rename = "webUrl", deserialize_with = "lenient_string")]
    pub web_url: Option<String>,

    #[serde(default, rename = "videoUrl", deserialize_with = "lenient_string")]
    pub video_url: Option<String>,

    /// Raw layout string; normalization to the known modes happens at merge
    /// time because an unknown value maps to `split` rather than being ignored.
    #[serde(default, deserialize_with = "lenient_string")]
    pub layout: Option<String>,

    /// Server-side modification time (epoch milliseconds). Carried but not
    /// used to gate merges; overlapping polls are last-applied-wins.
    #[serde(default, rename = "updatedAt", deserialize_with = "lenient_f64")]
    pub updated_at: Option<f64>,

    #[serde(default, deserialize_with = "lenient_screen")]
    pub screen: Option<ScreenConfig>,
}

/// Nested screen-geometry record.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ScreenConfig {
    #[serde(default, deserialize_with = "lenient_string")]
    pub orientation: Option<String>,

    /// Percent of display space allotted to the video panel, 0..100.
    #[serde(default, rename = "splitRatio", deserialize_with = "lenient_f64")]
    pub split_ratio: Option<f64>,

    #[serde(default, rename = "gapPx", deserialize_with = "lenient_f64")]
    pub gap_px: Option<f64>,

    #[serde(default, rename = "paddingPx", deserialize_with = "lenient_f64")]
    pub padding_px: Option<f64>,
}

impl RemoteConfig {
    /// Parse a response body. Fails only when `body` is not valid JSON;
    /// ill-typed fields inside a valid document decode to `None`.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

// ---------------------------------------------------------------------------
// Lenient field deserializers
//
// Each one accepts any JSON value and keeps only the expected shape. Numbers
// are additionally required to be finite so a stored value can never be NaN.
// ---------------------------------------------------------------------------

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|n| n.is_finite()))
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_bool())
}

fn lenient_screen<'de, D>(deserializer: D) -> Result<Option<ScreenConfig>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    // Every ScreenConfig field is itself lenient, so this cannot fail on an
    // object input; map the error anyway rather than unwrapping.
    serde_json::from_value(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_document() {
        let body = r#"{
            "deviceId": "kiosk-01",
            "exists": true,
            "webUrl": "https://example.com/queue",
            "videoUrl": "https://example.com/bg.mp4",
            "layout": "web_only",
            "updatedAt": 1724900000000,
            "screen": {
                "orientation": "column",
                "splitRatio": 35,
                "gapPx": 8,
                "paddingPx": 16
            }
        }"#;
        let cfg = RemoteConfig::parse(body).unwrap();
        assert_eq!(cfg.device_id.as_deref(), Some("kiosk-01"));
        assert_eq!(cfg.exists, Some(true));
        assert_eq!(cfg.web_url.as_deref(), Some("https://example.com/queue"));
        assert_eq!(cfg.layout.as_deref(), Some("web_only"));
        assert_eq!(cfg.updated_at, Some(1724900000000.0));
        let screen = cfg.screen.unwrap();
        assert_eq!(screen.orientation.as_deref(), Some("column"));
        assert_eq!(screen.split_ratio, Some(35.0));
        assert_eq!(screen.gap_px, Some(8.0));
        assert_eq!(screen.padding_px, Some(16.0));
    }

    #[test]
    fn missing_fields_decode_to_none() {
        let cfg = RemoteConfig::parse(r#"{"deviceId": "kiosk-01"}"#).unwrap();
        assert!(cfg.web_url.is_none());
        assert!(cfg.video_url.is_none());
        assert!(cfg.layout.is_none());
        assert!(cfg.screen.is_none());
    }

    #[test]
    fn ill_typed_field_does_not_poison_document() {
        let body = r#"{
            "webUrl": 42,
            "videoUrl": "https://example.com/bg.mp4",
            "screen": { "splitRatio": "abc", "gapPx": 10 }
        }"#;
        let cfg = RemoteConfig::parse(body).unwrap();
        assert!(cfg.web_url.is_none(), "non-string webUrl is ignored");
        assert_eq!(cfg.video_url.as_deref(), Some("https://example.com/bg.mp4"));
        let screen = cfg.screen.unwrap();
        assert!(screen.split_ratio.is_none(), "non-numeric splitRatio is ignored");
        assert_eq!(screen.gap_px, Some(10.0));
    }

    #[test]
    fn ill_typed_screen_decodes_to_none() {
        let cfg = RemoteConfig::parse(r#"{"screen": "fullscreen"}"#).unwrap();
        assert!(cfg.screen.is_none());
    }

    #[test]
    fn unknown_layout_string_passes_through_raw() {
        // Normalization to `split` is the merge's job, not the decoder's.
        let cfg = RemoteConfig::parse(r#"{"layout": "mosaic"}"#).unwrap();
        assert_eq!(cfg.layout.as_deref(), Some("mosaic"));
    }

    #[test]
    fn unknown_top_level_fields_are_ignored() {
        let cfg = RemoteConfig::parse(r#"{"webUrl": "https://a", "theme": "dark"}"#).unwrap();
        assert_eq!(cfg.web_url.as_deref(), Some("https://a"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        assert!(RemoteConfig::parse("this is not { json").is_err());
    }
}
