//! Core types for Netstream

use crate::drm::DrmConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Unique DOM id of the element a widget instance is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerId(String);

impl ContainerId {
    /// Generate a fresh `jwplayer-xxxxxxx` id (7 random base36 chars)
    pub fn generate() -> Self {
        const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

        let mut bits = Uuid::new_v4().as_u128();
        let suffix: String = (0..7)
            .map(|_| {
                let c = ALPHABET[(bits % 36) as usize] as char;
                bits /= 36;
                c
            })
            .collect();
        Self(format!("jwplayer-{}", suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContainerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stream container format selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    #[default]
    Auto,
    Hls,
    Dash,
    Mp4,
    Direct,
}

impl FormatHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatHint::Auto => "auto",
            FormatHint::Hls => "hls",
            FormatHint::Dash => "dash",
            FormatHint::Mp4 => "mp4",
            FormatHint::Direct => "direct",
        }
    }

    /// Value for the widget's `type` field; `None` lets the widget sniff the URL
    pub fn widget_type(&self) -> Option<&'static str> {
        match self {
            FormatHint::Hls => Some("hls"),
            FormatHint::Dash => Some("dash"),
            FormatHint::Mp4 => Some("mp4"),
            FormatHint::Auto | FormatHint::Direct => None,
        }
    }
}

impl std::str::FromStr for FormatHint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(FormatHint::Auto),
            "hls" => Ok(FormatHint::Hls),
            "dash" => Ok(FormatHint::Dash),
            "mp4" => Ok(FormatHint::Mp4),
            "direct" => Ok(FormatHint::Direct),
            other => Err(Error::InvalidConfig(format!("unknown video format: {other}"))),
        }
    }
}

impl std::fmt::Display for FormatHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which DRM tab is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrmMode {
    #[default]
    None,
    ClearKey,
    Widevine,
}

impl DrmMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrmMode::None => "none",
            DrmMode::ClearKey => "clearkey",
            DrmMode::Widevine => "widevine",
        }
    }
}

impl std::str::FromStr for DrmMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(DrmMode::None),
            "clearkey" => Ok(DrmMode::ClearKey),
            "widevine" => Ok(DrmMode::Widevine),
            other => Err(Error::InvalidConfig(format!("unknown DRM type: {other}"))),
        }
    }
}

impl std::fmt::Display for DrmMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the generated embed snippet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedFlavor {
    #[default]
    Iframe,
    Direct,
    Html,
    Json,
}

impl EmbedFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedFlavor::Iframe => "iframe",
            EmbedFlavor::Direct => "direct",
            EmbedFlavor::Html => "html",
            EmbedFlavor::Json => "json",
        }
    }
}

impl std::str::FromStr for EmbedFlavor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "iframe" => Ok(EmbedFlavor::Iframe),
            "direct" => Ok(EmbedFlavor::Direct),
            "html" => Ok(EmbedFlavor::Html),
            "json" => Ok(EmbedFlavor::Json),
            other => Err(Error::InvalidConfig(format!("unknown embed type: {other}"))),
        }
    }
}

/// Playback request handed to the adapter.
///
/// Never mutated after hand-off: a new value means a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Manifest or file URL
    pub source_url: String,
    /// Active DRM scheme
    pub drm: DrmConfig,
    /// Container format hint
    pub format_hint: FormatHint,
    /// Start playback as soon as the widget is ready
    pub autostart: bool,
}

impl StreamConfig {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            drm: DrmConfig::None,
            format_hint: FormatHint::Auto,
            autostart: true,
        }
    }

    pub fn with_drm(mut self, drm: DrmConfig) -> Self {
        self.drm = drm;
        self
    }

    pub fn with_format(mut self, format_hint: FormatHint) -> Self {
        self.format_hint = format_hint;
        self
    }

    /// Playlist item in the widget's configuration vocabulary
    pub fn to_playlist_item(&self) -> Value {
        let mut item = json!({
            "file": self.source_url,
            "autostart": self.autostart,
        });

        if let Some(kind) = self.format_hint.widget_type() {
            item["type"] = json!(kind);
        }
        if let Some(drm) = self.drm.to_widget_value() {
            item["drm"] = drm;
        }

        item
    }
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Transient toast-style message for the host to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn info(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn destructive(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            variant: NoticeVariant::Destructive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_id_shape() {
        let id = ContainerId::generate();
        assert!(id.as_str().starts_with("jwplayer-"));
        assert_eq!(id.as_str().len(), "jwplayer-".len() + 7);
        let suffix = &id.as_str()["jwplayer-".len()..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(id, ContainerId::generate());
    }

    #[test]
    fn test_format_hint_widget_type() {
        assert_eq!(FormatHint::Hls.widget_type(), Some("hls"));
        assert_eq!(FormatHint::Auto.widget_type(), None);
        assert_eq!(FormatHint::Direct.widget_type(), None);
        assert_eq!("dash".parse::<FormatHint>().unwrap(), FormatHint::Dash);
        assert!("webm".parse::<FormatHint>().is_err());
    }

    #[test]
    fn test_drm_mode_parse() {
        assert_eq!("clearkey".parse::<DrmMode>().unwrap(), DrmMode::ClearKey);
        assert_eq!("widevine".parse::<DrmMode>().unwrap(), DrmMode::Widevine);
        assert!("playready".parse::<DrmMode>().is_err());
    }

    #[test]
    fn test_playlist_item_without_drm() {
        let config = StreamConfig::new("https://cdn.example.com/live.m3u8");
        let item = config.to_playlist_item();

        assert_eq!(item["file"], "https://cdn.example.com/live.m3u8");
        assert_eq!(item["autostart"], true);
        assert!(item.get("drm").is_none());
        assert!(item.get("type").is_none());
    }

    #[test]
    fn test_playlist_item_with_format() {
        let config = StreamConfig::new("https://cdn.example.com/vod").with_format(FormatHint::Mp4);
        assert_eq!(config.to_playlist_item()["type"], "mp4");
    }
}
