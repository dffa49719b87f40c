//! JW Player bindings
//!
//! The library installs a global `jwplayer(id)` factory once its script has
//! loaded. Every call is made with `catch` so a missing global or a throwing
//! widget surfaces as `Error::Widget` instead of a trap.

use netstream_core::{ContainerId, Error, EventHandler, PlayerEventKind, PlayerFactory, PlayerWidget, Result};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// Instance returned by `jwplayer(id)`
    pub type JwInstance;

    #[wasm_bindgen(js_name = jwplayer, catch)]
    fn jwplayer(id: &str) -> std::result::Result<JwInstance, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn setup(this: &JwInstance, config: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn load(this: &JwInstance, playlist: &JsValue) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn on(
        this: &JwInstance,
        event: &str,
        handler: &Closure<dyn FnMut(JsValue)>,
    ) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn play(this: &JwInstance) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn pause(this: &JwInstance) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch, js_name = setMute)]
    fn set_mute(this: &JwInstance, muted: bool) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn remove(this: &JwInstance) -> std::result::Result<JsValue, JsValue>;
}

/// Whether the library script has installed its global
pub fn library_present() -> bool {
    js_sys::Reflect::has(&js_sys::global(), &JsValue::from_str("jwplayer")).unwrap_or(false)
}

pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

fn widget_error(value: JsValue) -> Error {
    Error::Widget(js_message(&value))
}

/// Plain JS objects, not `Map`s, so the widget can read them
fn to_js(value: &Value) -> Result<JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| Error::Widget(e.to_string()))
}

/// Factory over the global `jwplayer`
#[derive(Debug, Clone, Copy, Default)]
pub struct JwPlayerFactory;

impl PlayerFactory for JwPlayerFactory {
    fn create(&self, container: &ContainerId) -> Result<Box<dyn PlayerWidget>> {
        let instance = jwplayer(container.as_str()).map_err(widget_error)?;
        Ok(Box::new(JwWidget {
            instance,
            listeners: Vec::new(),
        }))
    }
}

/// One JW Player instance plus the closures it calls back into
pub struct JwWidget {
    instance: JwInstance,
    /// Dropping a closure invalidates it on the JS side
    listeners: Vec<Closure<dyn FnMut(JsValue)>>,
}

impl PlayerWidget for JwWidget {
    fn setup(&mut self, config: &Value) -> Result<()> {
        self.instance.setup(&to_js(config)?).map_err(widget_error)?;
        Ok(())
    }

    fn load(&mut self, playlist: &[Value]) -> Result<()> {
        let playlist = to_js(&Value::Array(playlist.to_vec()))?;
        self.instance.load(&playlist).map_err(widget_error)?;
        Ok(())
    }

    fn on(&mut self, event: PlayerEventKind, mut handler: EventHandler) -> Result<()> {
        let listener = Closure::wrap(Box::new(move |payload: JsValue| {
            let payload = serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null);
            handler(payload);
        }) as Box<dyn FnMut(JsValue)>);

        self.instance
            .on(event.as_str(), &listener)
            .map_err(widget_error)?;
        self.listeners.push(listener);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.instance.play().map_err(widget_error)?;
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.instance.pause().map_err(widget_error)?;
        Ok(())
    }

    fn set_mute(&mut self, muted: bool) -> Result<()> {
        self.instance.set_mute(muted).map_err(widget_error)?;
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        self.instance.remove().map_err(widget_error)?;
        self.listeners.clear();
        Ok(())
    }
}
