//! Browser implementations of the console's host capabilities

use crate::player::js_message;
use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use netstream_core::{Clipboard, ContainerId, Error, PlayerHost, Result, UrlProbe};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Request, RequestInit, Response};

fn document() -> Result<Document> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| Error::Platform("no document".into()))
}

/// The page's DOM; fullscreen targets the element wrapping the player
pub struct DocumentHost {
    fullscreen_target: String,
}

impl DocumentHost {
    pub fn new(fullscreen_target: impl Into<String>) -> Self {
        Self {
            fullscreen_target: fullscreen_target.into(),
        }
    }
}

impl PlayerHost for DocumentHost {
    fn container_present(&self, container: &ContainerId) -> bool {
        document()
            .map(|d| d.get_element_by_id(container.as_str()).is_some())
            .unwrap_or(false)
    }

    fn request_fullscreen(&self) -> Result<()> {
        let target = document()?
            .get_element_by_id(&self.fullscreen_target)
            .ok_or_else(|| Error::Platform(format!("#{} not found", self.fullscreen_target)))?;
        target
            .request_fullscreen()
            .map_err(|e| Error::Platform(js_message(&e)))
    }

    fn exit_fullscreen(&self) -> Result<()> {
        document()?.exit_fullscreen();
        Ok(())
    }
}

/// HEAD probe over `fetch`
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchProbe;

#[async_trait(?Send)]
impl UrlProbe for FetchProbe {
    async fn head(&self, url: &str) -> Result<u16> {
        let probe_error = |e: JsValue| Error::Probe(js_message(&e));

        let window = web_sys::window().ok_or_else(|| Error::Platform("no window".into()))?;
        let init = RequestInit::new();
        init.set_method("HEAD");

        let request = Request::new_with_str_and_init(url, &init).map_err(probe_error)?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(probe_error)?;
        let response: Response = response.dyn_into().map_err(probe_error)?;

        Ok(response.status())
    }
}

/// `navigator.clipboard.writeText`
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigatorClipboard;

#[async_trait(?Send)]
impl Clipboard for NavigatorClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let platform_error = |e: JsValue| Error::Platform(js_message(&e));

        let window = web_sys::window().ok_or_else(|| Error::Platform("no window".into()))?;
        let clipboard = Reflect::get(&window.navigator(), &JsValue::from_str("clipboard"))
            .map_err(platform_error)?;
        if clipboard.is_undefined() {
            return Err(Error::Platform("clipboard API unavailable".into()));
        }

        let write_text: Function = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .map_err(platform_error)?
            .dyn_into()
            .map_err(platform_error)?;
        let pending: Promise = write_text
            .call1(&clipboard, &JsValue::from_str(text))
            .map_err(platform_error)?
            .dyn_into()
            .map_err(platform_error)?;

        JsFuture::from(pending).await.map_err(platform_error)?;
        Ok(())
    }
}
