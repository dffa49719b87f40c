//! Console settings
//!
//! Everything a deployment may want to change without touching code: where
//! the player library lives, where embed links point, and the presentation
//! defaults merged into every widget setup.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Library served to the page that hosts the console
pub const DEFAULT_LIBRARY_URL: &str = "https://content.jwplatform.com/libraries/IDzF9Zmk.js";

/// Library referenced by generated HTML snippets; the key is a placeholder
pub const DEFAULT_SNIPPET_LIBRARY_URL: &str =
    "https://cdn.jwplayer.com/libraries/YOUR_JW_PLAYER_KEY.js";

/// Page that replays a stream from its query string
pub const DEFAULT_EMBED_BASE_URL: &str = "https://yoursite.com/embed";

/// Fixed presentation options merged into every widget setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationDefaults {
    pub width: String,
    pub aspect_ratio: String,
    /// Preferred rendering mode
    pub primary: String,
    /// Allow HLS through the browser's native pipeline
    pub hls_html: bool,
}

impl Default for PresentationDefaults {
    fn default() -> Self {
        Self {
            width: "100%".to_string(),
            aspect_ratio: "16:9".to_string(),
            primary: "html5".to_string(),
            hls_html: true,
        }
    }
}

/// Console configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// Player library script URL
    pub library_url: String,
    /// Player library referenced by HTML embed snippets
    pub snippet_library_url: String,
    /// Base URL of the iframe embed page
    pub embed_base_url: String,
    /// Iframe width in pixels
    pub iframe_width: u32,
    /// Iframe height in pixels
    pub iframe_height: u32,
    /// Widget presentation defaults
    pub presentation: PresentationDefaults,
    /// How long the "Copied" indicator stays up (milliseconds)
    pub copied_reset_ms: u32,
    /// Start playback whenever a new URL is entered
    pub auto_play_on_url_change: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            library_url: DEFAULT_LIBRARY_URL.to_string(),
            snippet_library_url: DEFAULT_SNIPPET_LIBRARY_URL.to_string(),
            embed_base_url: DEFAULT_EMBED_BASE_URL.to_string(),
            iframe_width: 640,
            iframe_height: 360,
            presentation: PresentationDefaults::default(),
            copied_reset_ms: 2000,
            auto_play_on_url_change: false,
        }
    }
}

impl ConsoleSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("library_url", &self.library_url),
            ("snippet_library_url", &self.snippet_library_url),
            ("embed_base_url", &self.embed_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| Error::InvalidConfig(format!("{name}: {e}")))?;
        }

        if self.iframe_width == 0 || self.iframe_height == 0 {
            return Err(Error::InvalidConfig("iframe size must be non-zero".into()));
        }

        Ok(())
    }
}
