//! Host capabilities the console depends on
//!
//! The page (or a test) supplies these: the DOM surface the player lives in,
//! the clipboard, and a way to probe a URL with a header-only request.

use crate::error::{Error, Result};
use crate::types::ContainerId;
use async_trait::async_trait;

/// DOM surface around the player
pub trait PlayerHost {
    /// Whether the widget's container element is in the document
    fn container_present(&self, container: &ContainerId) -> bool;

    /// Ask the platform to make the player container fullscreen
    fn request_fullscreen(&self) -> Result<()>;

    /// Leave fullscreen
    fn exit_fullscreen(&self) -> Result<()>;
}

/// System clipboard
#[async_trait(?Send)]
pub trait Clipboard {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Header-only reachability probe
#[async_trait(?Send)]
pub trait UrlProbe {
    /// Issue a HEAD request and return the status code.
    ///
    /// Network failures are `Error::Probe`.
    async fn head(&self, url: &str) -> Result<u16>;
}

/// 2xx and 3xx count as reachable
pub fn is_reachable(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Turn a probe outcome into the console's verdict
pub fn probe_verdict(outcome: Result<u16>) -> Result<u16> {
    match outcome {
        Ok(status) if is_reachable(status) => Ok(status),
        Ok(status) => Err(Error::Probe(format!("HTTP error! status: {status}"))),
        Err(Error::Probe(reason)) => Err(Error::Probe(reason)),
        Err(other) => Err(Error::Probe(other.to_string())),
    }
}

/// Native probe over reqwest
#[cfg(feature = "http")]
#[derive(Debug, Clone, Default)]
pub struct HttpProbe {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "http")]
#[async_trait(?Send)]
impl UrlProbe for HttpProbe {
    async fn head(&self, url: &str) -> Result<u16> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| Error::Probe(e.to_string()))?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachable_range() {
        assert!(is_reachable(200));
        assert!(is_reachable(204));
        assert!(is_reachable(302));
        assert!(!is_reachable(199));
        assert!(!is_reachable(404));
        assert!(!is_reachable(500));
    }

    #[test]
    fn test_probe_verdict() {
        assert_eq!(probe_verdict(Ok(200)).unwrap(), 200);

        let err = probe_verdict(Ok(403)).unwrap_err();
        assert_eq!(err.to_string(), "Stream test failed: HTTP error! status: 403");

        let err = probe_verdict(Err(Error::Probe("connection refused".into()))).unwrap_err();
        assert_eq!(err.to_string(), "Stream test failed: connection refused");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_http_probe_unreachable_host() {
        let probe = HttpProbe::new();
        let outcome = tokio_test::block_on(probe.head("http://127.0.0.1:1/stream.m3u8"));
        assert!(matches!(outcome, Err(Error::Probe(_))));
    }
}
