//! Netstream WASM - browser bindings for the stream console
//!
//! Wires `netstream-core` to the page:
//! - JW Player widget through the global `jwplayer(id)` factory
//! - HEAD reachability probe over `fetch`
//! - Clipboard and fullscreen through the DOM
//!
//! ## Usage
//!
//! ```javascript
//! import init, { NetstreamConsole, defaultSettings } from '@netstream/wasm';
//!
//! await init();
//! const settings = { ...JSON.parse(defaultSettings()), auto_play_on_url_change: true };
//! const ns = new NetstreamConsole('player-frame', JSON.stringify(settings));
//! await ns.load_library();
//! ```

use wasm_bindgen::prelude::*;

mod console;
mod host;
mod loader;
mod player;

pub use console::NetstreamConsole;
pub use host::{DocumentHost, FetchProbe, NavigatorClipboard};
pub use player::{JwPlayerFactory, JwWidget};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"[Netstream WASM] Initialized".into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Default console settings as a JSON string
#[wasm_bindgen(js_name = defaultSettings)]
pub fn default_settings() -> Result<String, JsValue> {
    serde_json::to_string(&netstream_core::ConsoleSettings::default())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
