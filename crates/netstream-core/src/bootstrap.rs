//! Deep-link bootstrap from page query parameters
//!
//! `?url=<stream>&drmtype=<clearkey|widevine>&drmvalue=<credential>`

use crate::error::{Error, Result};
use crate::types::DrmMode;
use tracing::warn;
use url::form_urlencoded;

/// Stream selection carried by a deep link
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BootstrapParams {
    pub url: String,
    pub drm_type: Option<DrmMode>,
    pub drm_value: Option<String>,
}

impl BootstrapParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_drm(mut self, drm_type: DrmMode, drm_value: impl Into<String>) -> Self {
        self.drm_type = Some(drm_type);
        self.drm_value = Some(drm_value.into());
        self
    }

    /// Read parameters from a query string, with or without the leading `?`.
    ///
    /// Returns `None` when there is no non-empty `url`, which skips bootstrap.
    pub fn from_query(query: &str) -> Option<Self> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = BootstrapParams::default();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "url" if params.url.is_empty() => params.url = value.into_owned(),
                "drmtype" if params.drm_type.is_none() => match value.parse::<DrmMode>() {
                    Ok(mode) => params.drm_type = Some(mode),
                    Err(_) => warn!(drmtype = %value, "Ignoring unknown DRM type in query"),
                },
                "drmvalue" if params.drm_value.is_none() => params.drm_value = Some(value.into_owned()),
                _ => {}
            }
        }

        if params.url.is_empty() {
            None
        } else {
            Some(params)
        }
    }

    /// Encode back into a query string (no leading `?`)
    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("url", &self.url);
        if let Some(mode) = self.drm_type {
            query.append_pair("drmtype", mode.as_str());
        }
        if let Some(value) = &self.drm_value {
            query.append_pair("drmvalue", value);
        }
        query.finish()
    }

    /// Full deep link against the console page URL
    pub fn deep_link(&self, page_url: &str) -> Result<String> {
        let mut page = url::Url::parse(page_url)
            .map_err(|e| Error::InvalidConfig(format!("page url: {e}")))?;
        page.set_query(Some(&self.to_query()));
        Ok(page.to_string())
    }
}
