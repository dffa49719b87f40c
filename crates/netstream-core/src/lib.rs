//! Netstream Core - Stream console library
//!
//! This crate provides everything behind the network stream page except the
//! player itself, which is an external widget reached through a trait:
//! - Stream/DRM configuration types
//! - ClearKey credential parsing (JSON key set or `kid:key` pair)
//! - Embed snippet generation (iframe, direct URL, HTML, JSON)
//! - Playback adapter driving the widget lifecycle
//! - Stream console owning all user-facing state
//! - Deep-link bootstrap from query parameters
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Stream Console                           │
//! │   url · format · drm tab · credentials · embed flavor · flags   │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐           │
//! │  │     DRM      │  │    Embed     │  │  Bootstrap   │           │
//! │  │   Resolver   │  │  Generator   │  │   (query)    │           │
//! │  └──────┬───────┘  └──────────────┘  └──────────────┘           │
//! │         │ StreamConfig                                          │
//! │  ┌──────┴───────┐          events          ┌──────────────┐     │
//! │  │   Playback   │ ◀─────────────────────── │    Player    │     │
//! │  │   Adapter    │ ───setup/load/remove───▶ │    Widget    │     │
//! │  └──────────────┘                          └──────────────┘     │
//! │                                                                 │
//! │  Host capabilities: PlayerHost · UrlProbe · Clipboard           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod drm;
pub mod settings;
pub mod embed;
pub mod widget;
pub mod adapter;
pub mod host;
pub mod bootstrap;
pub mod console;

pub use error::{Error, Result};
pub use types::*;
pub use drm::{parse_clearkey, DrmConfig};
pub use settings::{ConsoleSettings, PresentationDefaults};
pub use embed::{build_embed_code, EmbedSource};
pub use widget::{EventHandler, PlaybackFault, PlayerEventKind, PlayerFactory, PlayerWidget};
pub use adapter::{AdapterCallbacks, AdapterState, PlaybackAdapter};
pub use host::{is_reachable, Clipboard, PlayerHost, UrlProbe};
#[cfg(feature = "http")]
pub use host::HttpProbe;
pub use bootstrap::BootstrapParams;
pub use console::{ConsoleSnapshot, ConsoleState, StreamConsole};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() {
    tracing::info!(version = VERSION, "Netstream Core initialized");
}
