//! Playback Adapter - owns the single widget instance
//!
//! Lifecycle:
//!
//! ```text
//! Unmounted ──mount──▶ Initializing ──initialize──▶ Ready ◀──▶ Updating
//!                                                     │
//!                          unmount (any state) ──▶ TornDown
//! ```
//!
//! `initialize` is gated on the library factory AND the container element;
//! with either missing it does nothing and may be retried. Once Ready, new
//! configs go through the widget's `load`, never a second `setup`.

use crate::error::{Error, Result};
use crate::settings::PresentationDefaults;
use crate::types::{ContainerId, StreamConfig};
use crate::widget::{EventHandler, PlaybackFault, PlayerEventKind, PlayerFactory, PlayerWidget};
use serde_json::{json, Value};
use std::rc::Rc;
use tracing::{debug, error, info, warn};

/// Adapter lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Unmounted,
    /// Waiting for the library script and the container element
    Initializing,
    Ready,
    /// A `load` call is in flight
    Updating,
    /// Terminal
    TornDown,
}

/// Host callbacks for widget lifecycle events
#[derive(Clone, Default)]
pub struct AdapterCallbacks {
    pub on_ready: Option<Rc<dyn Fn()>>,
    pub on_error: Option<Rc<dyn Fn(&PlaybackFault)>>,
    pub on_play: Option<Rc<dyn Fn()>>,
    pub on_pause: Option<Rc<dyn Fn()>>,
}

impl AdapterCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_ready(mut self, f: impl Fn() + 'static) -> Self {
        self.on_ready = Some(Rc::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(&PlaybackFault) + 'static) -> Self {
        self.on_error = Some(Rc::new(f));
        self
    }

    pub fn on_play(mut self, f: impl Fn() + 'static) -> Self {
        self.on_play = Some(Rc::new(f));
        self
    }

    pub fn on_pause(mut self, f: impl Fn() + 'static) -> Self {
        self.on_pause = Some(Rc::new(f));
        self
    }

    fn handler_for(&self, kind: PlayerEventKind) -> EventHandler {
        match kind {
            PlayerEventKind::Ready => forward(self.on_ready.clone()),
            PlayerEventKind::Play => forward(self.on_play.clone()),
            PlayerEventKind::Pause => forward(self.on_pause.clone()),
            PlayerEventKind::Error => {
                let on_error = self.on_error.clone();
                Box::new(move |payload: Value| {
                    error!(payload = %payload, "Player widget error");
                    if let Some(cb) = &on_error {
                        cb(&PlaybackFault::new(payload));
                    }
                })
            }
        }
    }
}

fn forward(callback: Option<Rc<dyn Fn()>>) -> EventHandler {
    Box::new(move |_payload: Value| {
        if let Some(cb) = &callback {
            cb();
        }
    })
}

/// Merge the stream config with fixed presentation defaults.
///
/// Defaults win over anything the playlist item carries.
pub fn setup_config(config: &StreamConfig, defaults: &PresentationDefaults) -> Value {
    let mut merged = config.to_playlist_item();
    merged["width"] = json!(defaults.width);
    merged["aspectratio"] = json!(defaults.aspect_ratio);
    merged["primary"] = json!(defaults.primary);
    merged["hlshtml"] = json!(defaults.hls_html);
    merged
}

/// Thin lifecycle wrapper around one external widget instance
pub struct PlaybackAdapter {
    container: ContainerId,
    defaults: PresentationDefaults,
    callbacks: AdapterCallbacks,
    state: AdapterState,
    /// Latest config; used by `setup` if it arrives before initialization
    config: Option<StreamConfig>,
    widget: Option<Box<dyn PlayerWidget>>,
}

impl PlaybackAdapter {
    /// Create an adapter bound to a freshly generated container id
    pub fn new(defaults: PresentationDefaults, callbacks: AdapterCallbacks) -> Self {
        Self::with_container(ContainerId::generate(), defaults, callbacks)
    }

    pub fn with_container(
        container: ContainerId,
        defaults: PresentationDefaults,
        callbacks: AdapterCallbacks,
    ) -> Self {
        Self {
            container,
            defaults,
            callbacks,
            state: AdapterState::Unmounted,
            config: None,
            widget: None,
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn container(&self) -> &ContainerId {
        &self.container
    }

    pub fn config(&self) -> Option<&StreamConfig> {
        self.config.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        self.state == AdapterState::Ready
    }

    /// Mount with an initial config; the widget is created by `initialize`
    pub fn mount(&mut self, config: StreamConfig) -> Result<()> {
        match self.state {
            AdapterState::Unmounted => {
                debug!(container = %self.container, "Adapter mounting");
                self.config = Some(config);
                self.state = AdapterState::Initializing;
                Ok(())
            }
            _ => self.update(config),
        }
    }

    /// Create and set up the widget once the library and container exist.
    ///
    /// Returns `Ok(false)` when a precondition is missing; the call may be
    /// repeated later.
    pub fn initialize(&mut self, factory: Option<&dyn PlayerFactory>, container_present: bool) -> Result<bool> {
        if self.state != AdapterState::Initializing {
            return Ok(self.state == AdapterState::Ready);
        }

        let Some(factory) = factory else {
            debug!(container = %self.container, "Player library not loaded yet");
            return Ok(false);
        };
        if !container_present {
            debug!(container = %self.container, "Player container missing");
            return Ok(false);
        }
        let Some(config) = self.config.as_ref() else {
            return Ok(false);
        };

        let mut widget = factory.create(&self.container)?;
        let merged = setup_config(config, &self.defaults);

        if let Err(e) = widget.setup(&merged) {
            warn!(container = %self.container, error = %e, "Widget setup failed");
            if let Err(e) = widget.remove() {
                warn!(error = %e, "Failed to release widget after setup error");
            }
            return Err(e);
        }

        for kind in PlayerEventKind::ALL {
            if let Err(e) = widget.on(kind, self.callbacks.handler_for(kind)) {
                warn!(container = %self.container, event = kind.as_str(), error = %e, "Listener registration failed");
                if let Err(e) = widget.remove() {
                    warn!(error = %e, "Failed to release widget after listener error");
                }
                return Err(e);
            }
        }

        info!(container = %self.container, url = %config.source_url, "Player widget ready");
        self.widget = Some(widget);
        self.state = AdapterState::Ready;
        Ok(true)
    }

    /// Hand over a new config
    pub fn update(&mut self, config: StreamConfig) -> Result<()> {
        match self.state {
            AdapterState::Unmounted => self.mount(config),
            AdapterState::Initializing => {
                debug!(container = %self.container, "Replacing pending config");
                self.config = Some(config);
                Ok(())
            }
            AdapterState::Ready | AdapterState::Updating => {
                let widget = self
                    .widget
                    .as_mut()
                    .ok_or_else(|| Error::Widget("ready adapter has no widget".into()))?;

                self.state = AdapterState::Updating;
                let result = widget.load(&[config.to_playlist_item()]);
                self.state = AdapterState::Ready;
                result?;

                debug!(container = %self.container, url = %config.source_url, "Widget reloaded");
                self.config = Some(config);
                Ok(())
            }
            AdapterState::TornDown => Err(Error::Widget("adapter already torn down".into())),
        }
    }

    /// The widget, when set up and idle
    pub fn widget_mut(&mut self) -> Option<&mut (dyn PlayerWidget + 'static)> {
        if self.state == AdapterState::Ready {
            self.widget.as_deref_mut()
        } else {
            None
        }
    }

    /// Release the widget, if one was created. Terminal.
    pub fn unmount(&mut self) -> Result<()> {
        self.state = AdapterState::TornDown;
        match self.widget.take() {
            Some(mut widget) => {
                debug!(container = %self.container, "Removing player widget");
                widget.remove()
            }
            None => Ok(()),
        }
    }
}

impl Drop for PlaybackAdapter {
    fn drop(&mut self) {
        if let Err(e) = self.unmount() {
            warn!(error = %e, "Widget removal failed during drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct Log {
        calls: RefCell<Vec<String>>,
        handlers: RefCell<Vec<(PlayerEventKind, EventHandler)>>,
        /// Listener registration for this event is rejected
        reject_listener: Cell<Option<PlayerEventKind>>,
    }

    struct FakeWidget(Rc<Log>);

    impl PlayerWidget for FakeWidget {
        fn setup(&mut self, config: &Value) -> Result<()> {
            self.0.calls.borrow_mut().push(format!("setup {}", config["file"]));
            Ok(())
        }
        fn load(&mut self, playlist: &[Value]) -> Result<()> {
            self.0.calls.borrow_mut().push(format!("load {}", playlist[0]["file"]));
            Ok(())
        }
        fn on(&mut self, event: PlayerEventKind, handler: EventHandler) -> Result<()> {
            if self.0.reject_listener.get() == Some(event) {
                return Err(Error::Widget(format!("cannot listen for {}", event.as_str())));
            }
            self.0.handlers.borrow_mut().push((event, handler));
            Ok(())
        }
        fn play(&mut self) -> Result<()> {
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            Ok(())
        }
        fn set_mute(&mut self, _muted: bool) -> Result<()> {
            Ok(())
        }
        fn remove(&mut self) -> Result<()> {
            self.0.calls.borrow_mut().push("remove".into());
            Ok(())
        }
    }

    struct FakeFactory(Rc<Log>);

    impl PlayerFactory for FakeFactory {
        fn create(&self, _container: &ContainerId) -> Result<Box<dyn PlayerWidget>> {
            Ok(Box::new(FakeWidget(self.0.clone())))
        }
    }

    fn fire(log: &Log, kind: PlayerEventKind, payload: Value) {
        for (k, handler) in log.handlers.borrow_mut().iter_mut() {
            if *k == kind {
                handler(payload.clone());
            }
        }
    }

    #[test]
    fn test_setup_config_merges_defaults() {
        let config = StreamConfig::new("https://x/a.m3u8");
        let merged = setup_config(&config, &PresentationDefaults::default());

        assert_eq!(merged["file"], "https://x/a.m3u8");
        assert_eq!(merged["width"], "100%");
        assert_eq!(merged["aspectratio"], "16:9");
        assert_eq!(merged["primary"], "html5");
        assert_eq!(merged["hlshtml"], true);
    }

    #[test]
    fn test_initialize_gated_on_factory_and_container() {
        let log = Rc::new(Log::default());
        let factory = FakeFactory(log.clone());
        let mut adapter = PlaybackAdapter::new(PresentationDefaults::default(), AdapterCallbacks::new());

        adapter.mount(StreamConfig::new("https://x/a.m3u8")).unwrap();
        assert_eq!(adapter.state(), AdapterState::Initializing);

        assert!(!adapter.initialize(None, true).unwrap());
        assert!(!adapter.initialize(Some(&factory), false).unwrap());
        assert_eq!(adapter.state(), AdapterState::Initializing);
        assert!(log.calls.borrow().is_empty());

        assert!(adapter.initialize(Some(&factory), true).unwrap());
        assert_eq!(adapter.state(), AdapterState::Ready);
        assert_eq!(log.handlers.borrow().len(), 4);
    }

    #[test]
    fn test_update_uses_load_not_setup() {
        let log = Rc::new(Log::default());
        let factory = FakeFactory(log.clone());
        let mut adapter = PlaybackAdapter::new(PresentationDefaults::default(), AdapterCallbacks::new());

        adapter.mount(StreamConfig::new("https://x/one.m3u8")).unwrap();
        adapter.initialize(Some(&factory), true).unwrap();
        adapter.update(StreamConfig::new("https://x/two.m3u8")).unwrap();
        adapter.update(StreamConfig::new("https://x/three.m3u8")).unwrap();

        assert_eq!(
            *log.calls.borrow(),
            [
                r#"setup "https://x/one.m3u8""#,
                r#"load "https://x/two.m3u8""#,
                r#"load "https://x/three.m3u8""#,
            ]
        );
        assert_eq!(adapter.state(), AdapterState::Ready);
    }

    #[test]
    fn test_pending_config_replaced_before_setup() {
        let log = Rc::new(Log::default());
        let factory = FakeFactory(log.clone());
        let mut adapter = PlaybackAdapter::new(PresentationDefaults::default(), AdapterCallbacks::new());

        adapter.mount(StreamConfig::new("https://x/old.m3u8")).unwrap();
        adapter.update(StreamConfig::new("https://x/new.m3u8")).unwrap();
        adapter.initialize(Some(&factory), true).unwrap();

        assert_eq!(*log.calls.borrow(), [r#"setup "https://x/new.m3u8""#]);
    }

    #[test]
    fn test_events_forwarded() {
        let log = Rc::new(Log::default());
        let factory = FakeFactory(log.clone());
        let ready = Rc::new(Cell::new(0));
        let fault = Rc::new(RefCell::new(None));

        let callbacks = AdapterCallbacks::new()
            .on_ready({
                let ready = ready.clone();
                move || ready.set(ready.get() + 1)
            })
            .on_error({
                let fault = fault.clone();
                move |f: &PlaybackFault| *fault.borrow_mut() = Some(f.clone())
            });

        let mut adapter = PlaybackAdapter::new(PresentationDefaults::default(), callbacks);
        adapter.mount(StreamConfig::new("https://x/a.m3u8")).unwrap();
        adapter.initialize(Some(&factory), true).unwrap();

        fire(&log, PlayerEventKind::Ready, Value::Null);
        fire(&log, PlayerEventKind::Error, json!({ "message": "Cannot load M3U8" }));
        // No callback registered for play; must not panic
        fire(&log, PlayerEventKind::Play, Value::Null);

        assert_eq!(ready.get(), 1);
        assert_eq!(
            fault.borrow().as_ref().and_then(|f| f.message().map(str::to_owned)),
            Some("Cannot load M3U8".to_string())
        );
    }

    #[test]
    fn test_unmount_removes_once() {
        let log = Rc::new(Log::default());
        let factory = FakeFactory(log.clone());
        let mut adapter = PlaybackAdapter::new(PresentationDefaults::default(), AdapterCallbacks::new());

        adapter.mount(StreamConfig::new("https://x/a.m3u8")).unwrap();
        adapter.initialize(Some(&factory), true).unwrap();
        adapter.unmount().unwrap();
        adapter.unmount().unwrap();
        drop(adapter);

        let removes = log.calls.borrow().iter().filter(|c| *c == "remove").count();
        assert_eq!(removes, 1);
    }

    #[test]
    fn test_failed_listener_releases_widget() {
        let log = Rc::new(Log::default());
        let factory = FakeFactory(log.clone());
        let mut adapter = PlaybackAdapter::new(PresentationDefaults::default(), AdapterCallbacks::new());
        adapter.mount(StreamConfig::new("https://x/a.m3u8")).unwrap();

        log.reject_listener.set(Some(PlayerEventKind::Play));
        assert!(adapter.initialize(Some(&factory), true).is_err());
        assert_eq!(adapter.state(), AdapterState::Initializing);
        assert_eq!(*log.calls.borrow(), [r#"setup "https://x/a.m3u8""#, "remove"]);

        log.handlers.borrow_mut().clear();
        log.reject_listener.set(None);
        assert!(adapter.initialize(Some(&factory), true).unwrap());
        adapter.unmount().unwrap();

        let calls = log.calls.borrow();
        let setups = calls.iter().filter(|c| c.starts_with("setup")).count();
        let removes = calls.iter().filter(|c| *c == "remove").count();
        assert_eq!(setups, removes);

        let kinds: Vec<_> = log.handlers.borrow().iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, PlayerEventKind::ALL);
    }

    #[test]
    fn test_unmount_without_instance() {
        let mut adapter = PlaybackAdapter::new(PresentationDefaults::default(), AdapterCallbacks::new());
        adapter.mount(StreamConfig::new("https://x/a.m3u8")).unwrap();
        adapter.unmount().unwrap();

        assert_eq!(adapter.state(), AdapterState::TornDown);
        assert!(adapter.update(StreamConfig::new("https://x/b.m3u8")).is_err());
    }
}
