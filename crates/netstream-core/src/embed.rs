//! Embed snippet generation
//!
//! Every flavor is a pure function of the console's input state. Nothing here
//! validates the stream; an empty URL simply yields an empty snippet.

use crate::settings::ConsoleSettings;
use crate::types::{DrmMode, EmbedFlavor, FormatHint};
use serde::Serialize;

/// The slice of console state an embed snippet is derived from
#[derive(Debug, Clone, Copy)]
pub struct EmbedSource<'a> {
    pub url: &'a str,
    pub drm_mode: DrmMode,
    pub format: FormatHint,
    pub clearkey_text: &'a str,
    pub widevine_text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedDescriptor<'a> {
    url: &'a str,
    drm_type: DrmMode,
    video_format: FormatHint,
    #[serde(skip_serializing_if = "Option::is_none")]
    clear_key_data: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    widevine_data: Option<&'a str>,
}

/// Render the snippet for `flavor`
pub fn build_embed_code(flavor: EmbedFlavor, source: &EmbedSource<'_>, settings: &ConsoleSettings) -> String {
    if source.url.is_empty() {
        return String::new();
    }

    match flavor {
        EmbedFlavor::Iframe => iframe(source, settings),
        EmbedFlavor::Direct => source.url.to_string(),
        EmbedFlavor::Html => html_snippet(source, settings),
        EmbedFlavor::Json => json_descriptor(source),
    }
}

/// Query string carrying the stream URL and the active DRM credential
pub fn embed_query(source: &EmbedSource<'_>) -> String {
    let mut query = format!("url={}", urlencoding::encode(source.url));

    match source.drm_mode {
        DrmMode::None => {}
        DrmMode::ClearKey => {
            query.push_str("&drm=clearkey&clearkey=");
            query.push_str(&urlencoding::encode(source.clearkey_text));
        }
        DrmMode::Widevine => {
            query.push_str("&drm=widevine&widevine=");
            query.push_str(&urlencoding::encode(source.widevine_text));
        }
    }

    query
}

fn iframe(source: &EmbedSource<'_>, settings: &ConsoleSettings) -> String {
    format!(
        r#"<iframe src="{}?{}" width="{}" height="{}" frameborder="0" allowfullscreen></iframe>"#,
        settings.embed_base_url,
        embed_query(source),
        settings.iframe_width,
        settings.iframe_height,
    )
}

fn html_snippet(source: &EmbedSource<'_>, settings: &ConsoleSettings) -> String {
    // JSON string literals are valid JS string literals
    let file = serde_json::Value::from(source.url).to_string();

    format!(
        r#"<script src="{library}"></script>
<div id="player"></div>
<script>
  jwplayer("player").setup({{
    file: {file},
    autostart: true,
    mute: false,
    width: "{width}",
    aspectratio: "{aspect}"
  }});
</script>"#,
        library = settings.snippet_library_url,
        file = file,
        width = settings.presentation.width,
        aspect = settings.presentation.aspect_ratio,
    )
}

fn json_descriptor(source: &EmbedSource<'_>) -> String {
    let descriptor = EmbedDescriptor {
        url: source.url,
        drm_type: source.drm_mode,
        video_format: source.format,
        clear_key_data: (source.drm_mode == DrmMode::ClearKey).then_some(source.clearkey_text),
        widevine_data: (source.drm_mode == DrmMode::Widevine).then_some(source.widevine_text),
    };

    serde_json::to_string_pretty(&descriptor).unwrap_or_default()
}
