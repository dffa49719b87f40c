//! Stream Console - owns every piece of user-facing state
//!
//! Coordinates:
//! - Input state (URL, format, DRM tab and credentials, embed flavor)
//! - Playback requests handed to the [`PlaybackAdapter`]
//! - Widget events flowing back as playing/loading/error updates
//! - Reachability probe, clipboard copy, fullscreen
//!
//! State lives behind `Rc<RefCell<_>>` so widget callbacks and in-flight
//! probe/clipboard futures can update it. No borrow is held across a call
//! into the adapter or across an await.

use crate::adapter::{AdapterCallbacks, PlaybackAdapter};
use crate::bootstrap::BootstrapParams;
use crate::drm::DrmConfig;
use crate::embed::{build_embed_code, EmbedSource};
use crate::error::{Error, Result};
use crate::host::{probe_verdict, Clipboard, PlayerHost, UrlProbe};
use crate::settings::ConsoleSettings;
use crate::types::{DrmMode, EmbedFlavor, FormatHint, Notice, StreamConfig};
use crate::widget::{PlaybackFault, PlayerFactory};
use serde::Serialize;
use std::cell::{Ref, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, instrument, warn};

const EMPTY_URL: &str = "Please enter a valid stream URL";
const EMPTY_PROBE_URL: &str = "Please enter a URL to test";

/// Everything the page renders
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleState {
    pub url: String,
    pub format: FormatHint,
    pub drm_mode: DrmMode,
    pub clearkey_text: String,
    pub widevine_text: String,
    pub embed_flavor: EmbedFlavor,
    pub playing: bool,
    pub muted: bool,
    pub loading: bool,
    pub fullscreen: bool,
    pub copied: bool,
    /// Start playback whenever a new URL is entered
    pub auto_play: bool,
    /// Inline error message
    pub error: Option<String>,
    #[serde(skip)]
    notices: Vec<Notice>,
}

impl ConsoleState {
    fn embed_source(&self) -> EmbedSource<'_> {
        EmbedSource {
            url: &self.url,
            drm_mode: self.drm_mode,
            format: self.format,
            clearkey_text: &self.clearkey_text,
            widevine_text: &self.widevine_text,
        }
    }

    fn fail(&mut self, err: &Error) {
        debug!(code = err.error_code(), "Console error: {}", err);
        self.error = Some(err.to_string());
    }
}

/// Serializable view of the console for a host to render
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSnapshot {
    #[serde(flatten)]
    pub state: ConsoleState,
    pub embed_code: String,
    /// A player element should be on the page
    pub has_player: bool,
    pub container_id: Option<String>,
}

/// The console: input state plus the adapter it drives
pub struct StreamConsole {
    settings: ConsoleSettings,
    state: Rc<RefCell<ConsoleState>>,
    adapter: Option<PlaybackAdapter>,
    factory: Option<Rc<dyn PlayerFactory>>,
    host: Rc<dyn PlayerHost>,
    probe: Rc<dyn UrlProbe>,
    clipboard: Rc<dyn Clipboard>,
    bootstrapped: bool,
}

impl StreamConsole {
    pub fn new(
        settings: ConsoleSettings,
        host: Rc<dyn PlayerHost>,
        probe: Rc<dyn UrlProbe>,
        clipboard: Rc<dyn Clipboard>,
    ) -> Self {
        let state = ConsoleState {
            auto_play: settings.auto_play_on_url_change,
            ..ConsoleState::default()
        };

        Self {
            settings,
            state: Rc::new(RefCell::new(state)),
            adapter: None,
            factory: None,
            host,
            probe,
            clipboard,
            bootstrapped: false,
        }
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn state(&self) -> Ref<'_, ConsoleState> {
        self.state.borrow()
    }

    pub fn adapter(&self) -> Option<&PlaybackAdapter> {
        self.adapter.as_ref()
    }

    pub fn snapshot(&self) -> ConsoleSnapshot {
        ConsoleSnapshot {
            state: self.state.borrow().clone(),
            embed_code: self.embed_code(),
            has_player: self.adapter.is_some(),
            container_id: self.adapter.as_ref().map(|a| a.container().to_string()),
        }
    }

    /// Drain queued notices
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut self.state.borrow_mut().notices)
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        let auto_play = {
            let mut state = self.state.borrow_mut();
            let changed = state.url != url;
            state.url = url;
            changed && !state.url.is_empty() && state.auto_play
        };

        if auto_play {
            debug!("URL changed with auto-play enabled");
            self.request_playback();
        }
    }

    /// Flip the auto-play switch; the initial value comes from settings
    pub fn set_auto_play(&mut self, enabled: bool) {
        self.state.borrow_mut().auto_play = enabled;
    }

    pub fn set_format(&mut self, format: FormatHint) {
        self.state.borrow_mut().format = format;
    }

    pub fn set_drm_mode(&mut self, mode: DrmMode) {
        self.state.borrow_mut().drm_mode = mode;
    }

    pub fn set_clearkey_text(&mut self, text: impl Into<String>) {
        self.state.borrow_mut().clearkey_text = text.into();
    }

    pub fn set_widevine_text(&mut self, text: impl Into<String>) {
        self.state.borrow_mut().widevine_text = text.into();
    }

    pub fn set_embed_flavor(&mut self, flavor: EmbedFlavor) {
        self.state.borrow_mut().embed_flavor = flavor;
    }

    // ------------------------------------------------------------------
    // Playback
    // ------------------------------------------------------------------

    /// Build a config from current state and hand it to the adapter.
    ///
    /// Failures are recorded as the inline error; returns whether the config
    /// reached the adapter.
    #[instrument(skip(self))]
    pub fn request_playback(&mut self) -> bool {
        let config = {
            let mut state = self.state.borrow_mut();
            if state.url.is_empty() {
                state.fail(&Error::Validation(EMPTY_URL.to_string()));
                return false;
            }

            match DrmConfig::resolve(state.drm_mode, &state.clearkey_text, &state.widevine_text) {
                Ok(drm) => StreamConfig::new(state.url.clone())
                    .with_drm(drm)
                    .with_format(state.format),
                Err(e) => {
                    warn!(error = %e, "Rejecting DRM credentials");
                    state.fail(&e);
                    return false;
                }
            }
        };

        info!(url = %config.source_url, drm = %config.drm.mode(), "Playback requested");
        {
            let mut state = self.state.borrow_mut();
            state.error = None;
            state.loading = true;
            state.playing = true;
        }

        match self.hand_off(config) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Failed to hand config to player");
                let mut state = self.state.borrow_mut();
                state.fail(&e);
                state.loading = false;
                state.playing = false;
                false
            }
        }
    }

    fn hand_off(&mut self, config: StreamConfig) -> Result<()> {
        match self.adapter.as_mut() {
            Some(adapter) if adapter.is_ready() => {
                adapter.update(config)?;
                // A set-up widget does not fire `ready` again
                self.state.borrow_mut().loading = false;
            }
            Some(adapter) => adapter.update(config)?,
            None => {
                let mut adapter =
                    PlaybackAdapter::new(self.settings.presentation.clone(), self.callbacks());
                adapter.mount(config)?;
                self.adapter = Some(adapter);
            }
        }

        self.try_initialize().map(|_| ())
    }

    fn try_initialize(&mut self) -> Result<bool> {
        let Some(adapter) = self.adapter.as_mut() else {
            return Ok(false);
        };
        let present = self.host.container_present(adapter.container());
        adapter.initialize(self.factory.as_deref(), present)
    }

    /// The player library finished loading
    pub fn library_loaded(&mut self, factory: Rc<dyn PlayerFactory>) {
        info!("Player library loaded");
        self.factory = Some(factory);
        self.retry_initialize();
    }

    /// Re-attempt widget setup, e.g. after the container was rendered
    pub fn retry_initialize(&mut self) {
        if let Err(e) = self.try_initialize() {
            error!(error = %e, "Player initialization failed");
            let mut state = self.state.borrow_mut();
            state.fail(&e);
            state.loading = false;
            state.playing = false;
        }
    }

    fn callbacks(&self) -> AdapterCallbacks {
        let on_ready = Rc::downgrade(&self.state);
        let on_error = Rc::downgrade(&self.state);
        let on_play = Rc::downgrade(&self.state);
        let on_pause = Rc::downgrade(&self.state);

        AdapterCallbacks::new()
            .on_ready(move || {
                with_state(&on_ready, |state| state.loading = false);
            })
            .on_error(move |fault: &PlaybackFault| {
                with_state(&on_error, |state| {
                    let message = fault
                        .message()
                        .filter(|m| !m.is_empty())
                        .unwrap_or("Unknown error");
                    state.fail(&Error::Playback(message.to_string()));
                    state.loading = false;
                    state.playing = false;
                });
            })
            .on_play(move || {
                with_state(&on_play, |state| {
                    state.playing = true;
                    state.loading = false;
                });
            })
            .on_pause(move || {
                with_state(&on_pause, |state| state.playing = false);
            })
    }

    pub fn toggle_play_pause(&mut self) {
        let Some(widget) = self.adapter.as_mut().and_then(|a| a.widget_mut()) else {
            debug!("No player to toggle");
            return;
        };

        let playing = self.state.borrow().playing;
        let result = if playing { widget.pause() } else { widget.play() };
        match result {
            Ok(()) => self.state.borrow_mut().playing = !playing,
            Err(e) => warn!(error = %e, "Play/pause failed"),
        }
    }

    pub fn toggle_mute(&mut self) {
        let Some(widget) = self.adapter.as_mut().and_then(|a| a.widget_mut()) else {
            debug!("No player to mute");
            return;
        };

        let muted = self.state.borrow().muted;
        match widget.set_mute(!muted) {
            Ok(()) => self.state.borrow_mut().muted = !muted,
            Err(e) => warn!(error = %e, "Mute toggle failed"),
        }
    }

    /// Request or leave fullscreen; the flag follows `on_fullscreen_change`
    pub fn toggle_fullscreen(&self) {
        let fullscreen = self.state.borrow().fullscreen;
        let result = if fullscreen {
            self.host.exit_fullscreen()
        } else {
            self.host.request_fullscreen()
        };

        if let Err(e) = result {
            warn!(error = %e, "Fullscreen toggle failed");
        }
    }

    /// Platform fullscreen-change notification
    pub fn on_fullscreen_change(&self, fullscreen: bool) {
        self.state.borrow_mut().fullscreen = fullscreen;
    }

    /// Tear down the player, if any
    pub fn unmount(&mut self) {
        if let Some(mut adapter) = self.adapter.take() {
            if let Err(e) = adapter.unmount() {
                warn!(error = %e, "Player removal failed");
            }
        }
    }

    // ------------------------------------------------------------------
    // Reachability
    // ------------------------------------------------------------------

    /// HEAD-probe the current URL. Resolves to whether it was reachable.
    pub fn test_url_reachability(&self) -> impl Future<Output = bool> + 'static {
        let state = self.state.clone();
        let probe = self.probe.clone();

        async move {
            let url = {
                let mut state = state.borrow_mut();
                if state.url.is_empty() {
                    state.fail(&Error::Validation(EMPTY_PROBE_URL.to_string()));
                    return false;
                }
                state.error = None;
                state.loading = true;
                state.url.clone()
            };

            let verdict = probe_verdict(probe.head(&url).await);

            let mut state = state.borrow_mut();
            state.loading = false;
            match verdict {
                Ok(status) => {
                    info!(url = %url, status, "Stream reachable");
                    state.notices.push(Notice::info(
                        "Stream test successful",
                        "The URL appears to be accessible",
                    ));
                    true
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Stream test failed");
                    state.fail(&e);
                    false
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Embed
    // ------------------------------------------------------------------

    pub fn build_embed_code(&self, flavor: EmbedFlavor) -> String {
        let state = self.state.borrow();
        build_embed_code(flavor, &state.embed_source(), &self.settings)
    }

    /// Snippet for the currently selected flavor
    pub fn embed_code(&self) -> String {
        let flavor = self.state.borrow().embed_flavor;
        self.build_embed_code(flavor)
    }

    /// Copy the current snippet. Resolves to whether the write succeeded.
    pub fn copy_embed_code(&self) -> impl Future<Output = bool> + 'static {
        let code = self.embed_code();
        let state = self.state.clone();
        let clipboard = self.clipboard.clone();

        async move {
            if code.is_empty() {
                return false;
            }

            let result = clipboard.write_text(&code).await;

            let mut state = state.borrow_mut();
            match result {
                Ok(()) => {
                    state.copied = true;
                    state.notices.push(Notice::info("Copied!", "Embed code copied to clipboard"));
                    true
                }
                Err(e) => {
                    error!(error = %e, "Failed to copy");
                    state.notices.push(Notice::destructive(
                        "Copy failed",
                        "Please try again or copy manually",
                    ));
                    false
                }
            }
        }
    }

    /// Reset the "Copied" indicator
    pub fn clear_copied(&self) {
        self.state.borrow_mut().copied = false;
    }

    // ------------------------------------------------------------------
    // Bootstrap
    // ------------------------------------------------------------------

    /// Populate state from page query parameters and start playback.
    ///
    /// Runs at most once per console; later calls are ignored.
    pub fn bootstrap(&mut self, query: &str) -> bool {
        if self.bootstrapped {
            return false;
        }
        self.bootstrapped = true;

        let Some(params) = BootstrapParams::from_query(query) else {
            return false;
        };

        info!(url = %params.url, "Bootstrapping from query");
        {
            let mut state = self.state.borrow_mut();
            state.url = params.url;
            if let Some(mode) = params.drm_type {
                state.drm_mode = mode;
                match (mode, params.drm_value) {
                    (DrmMode::ClearKey, Some(value)) => state.clearkey_text = value,
                    (DrmMode::Widevine, Some(value)) => state.widevine_text = value,
                    _ => {}
                }
            }
        }

        self.request_playback()
    }
}

fn with_state(state: &Weak<RefCell<ConsoleState>>, f: impl FnOnce(&mut ConsoleState)) {
    if let Some(state) = state.upgrade() {
        f(&mut state.borrow_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContainerId;
    use async_trait::async_trait;

    struct NullHost;

    impl PlayerHost for NullHost {
        fn container_present(&self, _container: &ContainerId) -> bool {
            true
        }
        fn request_fullscreen(&self) -> Result<()> {
            Ok(())
        }
        fn exit_fullscreen(&self) -> Result<()> {
            Ok(())
        }
    }

    struct StatusProbe(u16);

    #[async_trait(?Send)]
    impl UrlProbe for StatusProbe {
        async fn head(&self, _url: &str) -> Result<u16> {
            Ok(self.0)
        }
    }

    struct NullClipboard;

    #[async_trait(?Send)]
    impl Clipboard for NullClipboard {
        async fn write_text(&self, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    fn console(status: u16) -> StreamConsole {
        StreamConsole::new(
            ConsoleSettings::default(),
            Rc::new(NullHost),
            Rc::new(StatusProbe(status)),
            Rc::new(NullClipboard),
        )
    }

    #[test]
    fn test_empty_url_rejected() {
        let mut console = console(200);
        assert!(!console.request_playback());
        assert_eq!(console.state().error.as_deref(), Some(EMPTY_URL));
        assert!(console.adapter().is_none());
    }

    #[test]
    fn test_playback_mounts_adapter_before_library() {
        let mut console = console(200);
        console.set_url("https://x/a.m3u8");

        assert!(console.request_playback());
        let state = console.state();
        assert!(state.playing);
        assert!(state.loading);
        assert!(state.error.is_none());
        drop(state);

        let snapshot = console.snapshot();
        assert!(snapshot.has_player);
        assert!(snapshot.container_id.unwrap().starts_with("jwplayer-"));
    }

    #[test]
    fn test_toggles_without_player_are_noops() {
        let mut console = console(200);
        console.toggle_play_pause();
        console.toggle_mute();
        assert!(!console.state().playing);
        assert!(!console.state().muted);
    }

    #[test]
    fn test_fullscreen_follows_notification() {
        let console = console(200);
        console.toggle_fullscreen();
        assert!(!console.state().fullscreen);

        console.on_fullscreen_change(true);
        assert!(console.state().fullscreen);
    }

    #[tokio::test]
    async fn test_probe_success_emits_notice() {
        let mut console = console(204);
        console.set_url("https://x/a.m3u8");

        assert!(console.test_url_reachability().await);
        assert!(!console.state().loading);
        let notices = console.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "Stream test successful");
    }

    #[tokio::test]
    async fn test_probe_requires_url() {
        let console = console(200);
        assert!(!console.test_url_reachability().await);
        assert_eq!(console.state().error.as_deref(), Some(EMPTY_PROBE_URL));
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let mut console = console(200);
        console.set_url("https://x/a.m3u8");
        console.set_embed_flavor(EmbedFlavor::Direct);

        let value = serde_json::to_value(console.snapshot()).unwrap();
        assert_eq!(value["url"], "https://x/a.m3u8");
        assert_eq!(value["embedFlavor"], "direct");
        assert_eq!(value["embedCode"], "https://x/a.m3u8");
        assert_eq!(value["drmMode"], "none");
        assert!(value.get("notices").is_none());
    }
}
