//! DRM - credential parsing for the widget's DRM block
//!
//! Two schemes are supported:
//! - ClearKey (raw key id / key pair, no license round-trip)
//! - Widevine (license server URL handed to the widget)
//!
//! ClearKey credentials arrive as text in one of two forms:
//!
//! ```text
//! {"keys":[{"kid":"<base64>","k":"<base64>"}]}   -> base64 decoded to hex
//! e1e1fa75dadfdd82:37f1b4f7507a6e89              -> taken verbatim
//! ```

use crate::error::{Error, Result};
use crate::types::DrmMode;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// DRM configuration for a single playback request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrmConfig {
    #[default]
    None,
    ClearKey {
        /// Key id, hex
        key_id: String,
        /// Content key, hex
        key: String,
    },
    Widevine {
        /// License server endpoint
        license_url: String,
    },
}

impl DrmConfig {
    /// Build the DRM config for the active tab.
    ///
    /// Empty credential text means no DRM block at all, even when a scheme is
    /// selected.
    pub fn resolve(mode: DrmMode, clearkey_text: &str, widevine_text: &str) -> Result<Self> {
        match mode {
            DrmMode::None => Ok(DrmConfig::None),
            DrmMode::ClearKey if clearkey_text.is_empty() => Ok(DrmConfig::None),
            DrmMode::ClearKey => parse_clearkey(clearkey_text),
            DrmMode::Widevine if widevine_text.is_empty() => Ok(DrmConfig::None),
            DrmMode::Widevine => Ok(DrmConfig::Widevine {
                license_url: widevine_text.to_string(),
            }),
        }
    }

    pub fn mode(&self) -> DrmMode {
        match self {
            DrmConfig::None => DrmMode::None,
            DrmConfig::ClearKey { .. } => DrmMode::ClearKey,
            DrmConfig::Widevine { .. } => DrmMode::Widevine,
        }
    }

    /// The `drm` block of a widget playlist item
    pub fn to_widget_value(&self) -> Option<Value> {
        match self {
            DrmConfig::None => None,
            DrmConfig::ClearKey { key_id, key } => Some(json!({
                "clearkey": { "keyId": key_id, "key": key }
            })),
            DrmConfig::Widevine { license_url } => Some(json!({
                "widevine": { "url": license_url }
            })),
        }
    }
}

#[derive(Deserialize)]
struct ClearKeySet {
    keys: Vec<ClearKeyEntry>,
}

#[derive(Deserialize)]
struct ClearKeyEntry {
    kid: String,
    k: String,
}

/// Parse ClearKey credential text in either accepted form.
///
/// Text mentioning `kid` or opening with `{` is a JSON key set; anything
/// else is a `kid:key` pair.
pub fn parse_clearkey(text: &str) -> Result<DrmConfig> {
    if text.contains("kid") || text.trim_start().starts_with('{') {
        parse_clearkey_json(text)
    } else {
        parse_clearkey_pair(text)
    }
}

fn parse_clearkey_json(text: &str) -> Result<DrmConfig> {
    let set: ClearKeySet = serde_json::from_str(text).map_err(|e| {
        debug!(error = %e, "ClearKey JSON rejected");
        Error::malformed_clearkey()
    })?;

    // Only the first key is used
    let entry = set.keys.first().ok_or_else(Error::malformed_clearkey)?;
    let key_id = hex::encode(decode_base64(&entry.kid)?);
    let key = hex::encode(decode_base64(&entry.k)?);

    debug!(kid = %key_id, "ClearKey decoded from JSON");
    Ok(DrmConfig::ClearKey { key_id, key })
}

fn parse_clearkey_pair(text: &str) -> Result<DrmConfig> {
    let mut parts = text.split(':');
    let key_id = parts.next().unwrap_or_default();
    let key = parts.next().ok_or_else(Error::malformed_clearkey)?;

    Ok(DrmConfig::ClearKey {
        key_id: key_id.to_string(),
        key: key.to_string(),
    })
}

/// Decode standard or URL-safe base64, padded or not
fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let normalized: String = data
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    STANDARD_NO_PAD
        .decode(normalized)
        .map_err(|_| Error::malformed_clearkey())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clearkey_json_to_hex() {
        let text = r#"{"keys":[{"kid":"ZmFrZWtpZA==","k":"ZmFrZWtleQ=="}]}"#;
        let config = parse_clearkey(text).unwrap();

        assert_eq!(
            config,
            DrmConfig::ClearKey {
                key_id: hex::encode("fakekid"),
                key: hex::encode("fakekey"),
            }
        );
    }

    #[test]
    fn test_clearkey_json_url_safe() {
        // 0xfb 0xff encodes to "-_8" in the URL-safe alphabet
        let text = r#"{"keys":[{"kty":"oct","kid":"-_8","k":"-_8"}]}"#;
        let config = parse_clearkey(text).unwrap();
        assert_eq!(
            config,
            DrmConfig::ClearKey { key_id: "fbff".into(), key: "fbff".into() }
        );
    }

    #[test]
    fn test_clearkey_pair_verbatim() {
        let config = parse_clearkey("abc123:def456").unwrap();
        assert_eq!(
            config,
            DrmConfig::ClearKey { key_id: "abc123".into(), key: "def456".into() }
        );
    }

    #[test]
    fn test_clearkey_pair_extra_tokens_ignored() {
        let config = parse_clearkey("aa:bb:cc").unwrap();
        assert_eq!(config, DrmConfig::ClearKey { key_id: "aa".into(), key: "bb".into() });
    }

    #[test]
    fn test_clearkey_malformed() {
        assert!(matches!(parse_clearkey(r#"{"keys":[}"#), Err(Error::MalformedDrm(_))));
        assert!(matches!(parse_clearkey(r#"{"keys":[], "kid": 1}"#), Err(Error::MalformedDrm(_))));
        assert!(matches!(parse_clearkey(r#"{"keys":[{"kid":"%%","k":"AA"}]}"#), Err(Error::MalformedDrm(_))));
        assert!(matches!(parse_clearkey("no-separator"), Err(Error::MalformedDrm(_))));
    }

    #[test]
    fn test_clearkey_broken_json_without_kid() {
        // Contains a ':' but must not be read as a pair
        let err = parse_clearkey(r#"{"keys":[}"#).unwrap_err();
        assert_eq!(err.to_string(), "Invalid ClearKey JSON format");
        assert!(matches!(parse_clearkey(r#"  {"keys":[]}"#), Err(Error::MalformedDrm(_))));
    }

    #[test]
    fn test_resolve_empty_credentials() {
        assert_eq!(DrmConfig::resolve(DrmMode::ClearKey, "", "x").unwrap(), DrmConfig::None);
        assert_eq!(DrmConfig::resolve(DrmMode::Widevine, "x", "").unwrap(), DrmConfig::None);
        assert_eq!(DrmConfig::resolve(DrmMode::None, "a:b", "https://lic").unwrap(), DrmConfig::None);
    }

    #[test]
    fn test_widevine_widget_value() {
        let config = DrmConfig::resolve(DrmMode::Widevine, "", "https://lic.example.com/wv").unwrap();
        assert_eq!(config.mode(), DrmMode::Widevine);
        assert_eq!(
            config.to_widget_value().unwrap(),
            json!({ "widevine": { "url": "https://lic.example.com/wv" } })
        );
    }
}
