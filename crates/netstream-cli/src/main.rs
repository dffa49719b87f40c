//! Netstream CLI - stream console tooling for the terminal
//!
//! Features:
//! - Embed snippets (iframe, direct, HTML, JSON)
//! - Stream reachability probe
//! - ClearKey credential decoding
//! - Deep links that replay a stream on page load

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// Netstream CLI - Stream console toolkit
#[derive(Parser)]
#[command(name = "netstream")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Embed, probe and decode network video streams", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Console settings file (JSON, any subset of fields)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an embed snippet for a stream
    Embed {
        /// Stream URL
        url: String,

        /// Snippet flavor (iframe, direct, html, json)
        #[arg(short = 't', long, default_value = "iframe")]
        flavor: String,

        /// DRM scheme (none, clearkey, widevine)
        #[arg(short, long, default_value = "none")]
        drm: String,

        /// ClearKey credential text (JSON key set or kid:key)
        #[arg(long)]
        clearkey: Option<String>,

        /// Widevine license server URL
        #[arg(long)]
        widevine: Option<String>,

        /// Stream format hint (auto, hls, dash, mp4, direct)
        #[arg(long, default_value = "auto")]
        hint: String,
    },

    /// Test whether a stream URL answers a HEAD request
    Probe {
        /// Stream URL
        url: String,
    },

    /// Decode ClearKey credential text into its hex key pair
    Clearkey {
        /// Credential text (JSON key set or kid:key)
        text: String,
    },

    /// Build a page link that plays the stream on load
    Link {
        /// Stream URL
        url: String,

        /// DRM scheme (clearkey, widevine)
        #[arg(long, requires = "drm_value")]
        drm_type: Option<String>,

        /// Credential for the DRM scheme
        #[arg(long, requires = "drm_type")]
        drm_value: Option<String>,

        /// Page that hosts the console (defaults to the embed base URL)
        #[arg(short, long)]
        page: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    let settings = commands::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Embed { url, flavor, drm, clearkey, widevine, hint } => {
            let request = commands::EmbedRequest {
                url,
                flavor,
                drm,
                clearkey: clearkey.unwrap_or_default(),
                widevine: widevine.unwrap_or_default(),
                hint,
            };
            commands::embed(&request, &settings)?;
        }
        Commands::Probe { url } => {
            commands::probe(&url, &cli.format).await?;
        }
        Commands::Clearkey { text } => {
            commands::clearkey(&text, &cli.format)?;
        }
        Commands::Link { url, drm_type, drm_value, page } => {
            let page = page.unwrap_or_else(|| settings.embed_base_url.clone());
            commands::link(&url, drm_type.as_deref(), drm_value.as_deref(), &page)?;
        }
    }

    Ok(())
}
