//! Script loader for the player library

use crate::player::library_present;
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlScriptElement;

/// Inject `<script src>` into the document head and wait for its load event.
///
/// Resolves immediately when the library global already exists.
pub async fn load_library(src: &str) -> Result<(), JsValue> {
    if library_present() {
        return Ok(());
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let head = document.head().ok_or_else(|| JsValue::from_str("no document head"))?;

    let script: HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(src);
    script.set_async(true);

    let loaded = Promise::new(&mut |resolve: Function, reject: Function| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });

    head.append_child(&script)?;
    JsFuture::from(loaded).await?;

    web_sys::console::log_1(&format!("[Netstream] Player library loaded from {}", src).into());
    Ok(())
}
