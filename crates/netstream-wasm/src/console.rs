//! `NetstreamConsole` - the stream console exposed to JavaScript
//!
//! ## Usage
//!
//! ```javascript
//! import init, { NetstreamConsole } from '@netstream/wasm';
//!
//! await init();
//! const ns = new NetstreamConsole('player-frame');
//! ns.bootstrap_from_location();
//! await ns.load_library();
//!
//! ns.set_url('https://example.com/stream.m3u8');
//! ns.play();
//! render(ns.snapshot()); // then place <div id={snapshot.containerId}> and call ns.container_ready()
//! ```

use crate::host::{DocumentHost, FetchProbe, NavigatorClipboard};
use crate::loader;
use crate::player::{js_message, JwPlayerFactory};
use serde::Serialize;
use netstream_core::{ConsoleSettings, DrmMode, EmbedFlavor, FormatHint, StreamConsole};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;

fn to_js_error(err: netstream_core::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Objects rather than `Map`s; the snapshot flattens its state into a map
fn to_plain_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Stream console bound to the page
#[wasm_bindgen]
pub struct NetstreamConsole {
    inner: Rc<RefCell<StreamConsole>>,
    fullscreen_listener: Option<Closure<dyn FnMut()>>,
}

#[wasm_bindgen]
impl NetstreamConsole {
    /// `fullscreen_target` is the id of the element wrapping the player.
    /// `settings_json` overrides any subset of the console settings.
    #[wasm_bindgen(constructor)]
    pub fn new(fullscreen_target: String, settings_json: Option<String>) -> Result<NetstreamConsole, JsValue> {
        let settings = match settings_json {
            Some(json) => ConsoleSettings::from_json(&json).map_err(to_js_error)?,
            None => ConsoleSettings::default(),
        };

        let console = StreamConsole::new(
            settings,
            Rc::new(DocumentHost::new(fullscreen_target)),
            Rc::new(FetchProbe),
            Rc::new(NavigatorClipboard),
        );

        let mut this = NetstreamConsole {
            inner: Rc::new(RefCell::new(console)),
            fullscreen_listener: None,
        };
        this.watch_fullscreen()?;
        Ok(this)
    }

    fn watch_fullscreen(&mut self) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let weak = Rc::downgrade(&self.inner);
        let doc = document.clone();
        let listener = Closure::wrap(Box::new(move || {
            if let Some(console) = weak.upgrade() {
                console
                    .borrow()
                    .on_fullscreen_change(doc.fullscreen_element().is_some());
            }
        }) as Box<dyn FnMut()>);

        document.add_event_listener_with_callback("fullscreenchange", listener.as_ref().unchecked_ref())?;
        self.fullscreen_listener = Some(listener);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    #[wasm_bindgen]
    pub fn set_url(&self, url: String) {
        self.inner.borrow_mut().set_url(url);
    }

    /// The auto-play switch: play whenever a new URL is entered
    #[wasm_bindgen]
    pub fn set_auto_play(&self, enabled: bool) {
        self.inner.borrow_mut().set_auto_play(enabled);
    }

    #[wasm_bindgen]
    pub fn set_format(&self, format: &str) -> Result<(), JsValue> {
        let format: FormatHint = format.parse().map_err(to_js_error)?;
        self.inner.borrow_mut().set_format(format);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_drm_mode(&self, mode: &str) -> Result<(), JsValue> {
        let mode: DrmMode = mode.parse().map_err(to_js_error)?;
        self.inner.borrow_mut().set_drm_mode(mode);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_clearkey_text(&self, text: String) {
        self.inner.borrow_mut().set_clearkey_text(text);
    }

    #[wasm_bindgen]
    pub fn set_widevine_text(&self, text: String) {
        self.inner.borrow_mut().set_widevine_text(text);
    }

    #[wasm_bindgen]
    pub fn set_embed_flavor(&self, flavor: &str) -> Result<(), JsValue> {
        let flavor: EmbedFlavor = flavor.parse().map_err(to_js_error)?;
        self.inner.borrow_mut().set_embed_flavor(flavor);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Player
    // ------------------------------------------------------------------

    /// Load the player library, then set up any pending playback
    #[wasm_bindgen]
    pub fn load_library(&self) -> js_sys::Promise {
        let inner = self.inner.clone();
        let src = inner.borrow().settings().library_url.clone();

        future_to_promise(async move {
            loader::load_library(&src).await?;
            inner.borrow_mut().library_loaded(Rc::new(JwPlayerFactory));
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Call after the player container from `snapshot().containerId` is in the DOM
    #[wasm_bindgen]
    pub fn container_ready(&self) {
        self.inner.borrow_mut().retry_initialize();
    }

    #[wasm_bindgen]
    pub fn play(&self) -> bool {
        self.inner.borrow_mut().request_playback()
    }

    #[wasm_bindgen]
    pub fn toggle_play_pause(&self) {
        self.inner.borrow_mut().toggle_play_pause();
    }

    #[wasm_bindgen]
    pub fn toggle_mute(&self) {
        self.inner.borrow_mut().toggle_mute();
    }

    #[wasm_bindgen]
    pub fn toggle_fullscreen(&self) {
        self.inner.borrow().toggle_fullscreen();
    }

    /// Read `?url=&drmtype=&drmvalue=` from the page and play once
    #[wasm_bindgen]
    pub fn bootstrap_from_location(&self) -> Result<bool, JsValue> {
        let search = web_sys::window()
            .ok_or_else(|| JsValue::from_str("no window"))?
            .location()
            .search()?;
        Ok(self.inner.borrow_mut().bootstrap(&search))
    }

    #[wasm_bindgen]
    pub fn unmount(&self) {
        self.inner.borrow_mut().unmount();
    }

    // ------------------------------------------------------------------
    // Probe / embed
    // ------------------------------------------------------------------

    /// Resolves to `true` when the URL answered a HEAD request with 2xx/3xx
    #[wasm_bindgen]
    pub fn test_url(&self) -> js_sys::Promise {
        let probe = self.inner.borrow().test_url_reachability();
        future_to_promise(async move { Ok(JsValue::from_bool(probe.await)) })
    }

    #[wasm_bindgen]
    pub fn embed_code(&self) -> String {
        self.inner.borrow().embed_code()
    }

    #[wasm_bindgen]
    pub fn build_embed_code(&self, flavor: &str) -> Result<String, JsValue> {
        let flavor: EmbedFlavor = flavor.parse().map_err(to_js_error)?;
        Ok(self.inner.borrow().build_embed_code(flavor))
    }

    /// Copy the current snippet; the "Copied" flag clears itself later
    #[wasm_bindgen]
    pub fn copy_embed_code(&self) -> js_sys::Promise {
        let (copy, reset_ms) = {
            let console = self.inner.borrow();
            (console.copy_embed_code(), console.settings().copied_reset_ms)
        };
        let weak = Rc::downgrade(&self.inner);

        future_to_promise(async move {
            let copied = copy.await;
            if copied {
                let reset = Closure::once_into_js(move || {
                    if let Some(console) = weak.upgrade() {
                        console.borrow().clear_copied();
                    }
                });
                if let Some(window) = web_sys::window() {
                    window.set_timeout_with_callback_and_timeout_and_arguments_0(
                        reset.unchecked_ref(),
                        i32::try_from(reset_ms).unwrap_or(i32::MAX),
                    )?;
                }
            }
            Ok(JsValue::from_bool(copied))
        })
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Full view state as a plain object (camelCase keys)
    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        let snapshot = self.inner.borrow().snapshot();
        to_plain_js(&snapshot)
    }

    /// Pending toasts, oldest first
    #[wasm_bindgen]
    pub fn take_notices(&self) -> Result<JsValue, JsValue> {
        let notices = self.inner.borrow().take_notices();
        to_plain_js(&notices)
    }
}

impl Drop for NetstreamConsole {
    fn drop(&mut self) {
        if let Some(listener) = self.fullscreen_listener.take() {
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                if let Err(e) = document.remove_event_listener_with_callback(
                    "fullscreenchange",
                    listener.as_ref().unchecked_ref(),
                ) {
                    web_sys::console::warn_1(
                        &format!("[Netstream] Failed to remove fullscreen listener: {}", js_message(&e)).into(),
                    );
                }
            }
        }
        self.inner.borrow_mut().unmount();
    }
}
