//! CLI command implementations

use crate::output::{self, OutputFormat};
use netstream_core::host::probe_verdict;
use netstream_core::{
    build_embed_code, parse_clearkey, BootstrapParams, ConsoleSettings, DrmConfig, DrmMode,
    EmbedFlavor, EmbedSource, Error, FormatHint, HttpProbe, UrlProbe,
};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Load console settings, falling back to defaults without a file
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<ConsoleSettings> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading settings");
            let json = std::fs::read_to_string(path)?;
            Ok(ConsoleSettings::from_json(&json)?)
        }
        None => Ok(ConsoleSettings::default()),
    }
}

/// Arguments of the `embed` command
pub struct EmbedRequest {
    pub url: String,
    pub flavor: String,
    pub drm: String,
    pub clearkey: String,
    pub widevine: String,
    pub hint: String,
}

/// Render the snippet for an embed request
pub fn render_embed(request: &EmbedRequest, settings: &ConsoleSettings) -> anyhow::Result<String> {
    if request.url.trim().is_empty() {
        return Err(Error::Validation("Please enter a valid stream URL".into()).into());
    }

    let flavor: EmbedFlavor = request.flavor.parse()?;
    let drm_mode: DrmMode = request.drm.parse()?;
    let format: FormatHint = request.hint.parse()?;

    // Reject credentials the player would refuse before handing out a snippet
    DrmConfig::resolve(drm_mode, &request.clearkey, &request.widevine)?;

    let source = EmbedSource {
        url: &request.url,
        drm_mode,
        format,
        clearkey_text: &request.clearkey,
        widevine_text: &request.widevine,
    };
    Ok(build_embed_code(flavor, &source, settings))
}

/// Print an embed snippet
pub fn embed(request: &EmbedRequest, settings: &ConsoleSettings) -> anyhow::Result<()> {
    let code = render_embed(request, settings)?;
    info!(flavor = %request.flavor, "Embed code generated");
    println!("{}", code);
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProbeReport<'a> {
    url: &'a str,
    reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Probe a stream URL with a HEAD request
pub async fn probe(url: &str, format: &str) -> anyhow::Result<()> {
    if url.trim().is_empty() {
        return Err(Error::Validation("Please enter a URL to test".into()).into());
    }

    let spinner = output::spinner(&format!("Testing {}", url));
    let outcome = probe_verdict(HttpProbe::new().head(url).await);
    spinner.finish_and_clear();

    let report = match &outcome {
        Ok(status) => ProbeReport {
            url,
            reachable: true,
            status: Some(*status),
            error: None,
        },
        Err(e) => ProbeReport {
            url,
            reachable: false,
            status: None,
            error: Some(e.to_string()),
        },
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&report)),
        OutputFormat::Text | OutputFormat::Table => match &outcome {
            Ok(status) => {
                output::success("Stream test successful");
                println!("  The URL appears to be accessible (HTTP {})", status);
            }
            Err(e) => output::failure(&e.to_string()),
        },
    }

    if outcome.is_err() {
        std::process::exit(1);
    }

    Ok(())
}

#[derive(Debug, Serialize, tabled::Tabled)]
struct KeyPair {
    #[serde(rename = "keyId")]
    #[tabled(rename = "Key ID")]
    key_id: String,
    #[tabled(rename = "Key")]
    key: String,
}

/// Decode ClearKey credential text
pub fn clearkey(text: &str, format: &str) -> anyhow::Result<()> {
    let pair = match parse_clearkey(text)? {
        DrmConfig::ClearKey { key_id, key } => KeyPair { key_id, key },
        other => anyhow::bail!("expected a ClearKey pair, got {:?}", other.mode()),
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", output::to_json(&pair)),
        OutputFormat::Table => println!("{}", output::table(std::iter::once(pair))),
        OutputFormat::Text => {
            println!("Key ID: {}", pair.key_id);
            println!("Key:    {}", pair.key);
        }
    }

    Ok(())
}

/// Print a deep link carrying the bootstrap parameters
pub fn link(
    url: &str,
    drm_type: Option<&str>,
    drm_value: Option<&str>,
    page: &str,
) -> anyhow::Result<()> {
    let mut params = BootstrapParams::new(url);
    if let (Some(drm_type), Some(drm_value)) = (drm_type, drm_value) {
        params = params.with_drm(drm_type.parse()?, drm_value);
    }

    println!("{}", params.deep_link(page)?);
    Ok(())
}
