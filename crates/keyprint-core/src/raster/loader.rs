//! Image loading for export
//!
//! Loads are blocking and run on the blocking pool; the caller bounds each
//! one with a timeout.

use crate::options::KioskOptions;
use crate::share::decode_data_uri;
use crate::types::{KeyprintError, Result};
use image::DynamicImage;
use std::io::Read;
use std::time::Duration;
use url::Url;

/// Upper bound on a downloaded image body
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

/// Resolves an image reference to decoded pixels
pub trait ImageLoader: Send + Sync {
    fn load(&self, reference: &str) -> Result<DynamicImage>;
}

/// Loads `data:` URIs in place and `http(s)` URLs over the network,
/// routing cross-origin URLs through the image proxy when one is configured
#[derive(Clone)]
pub struct HttpImageLoader {
    agent: ureq::Agent,
    origin: Option<Url>,
    proxy: Option<Url>,
}

impl HttpImageLoader {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent("keyprint")
            .build();
        Self {
            agent,
            origin: None,
            proxy: None,
        }
    }

    pub fn from_options(options: &KioskOptions) -> Result<Self> {
        Ok(Self::new(options.image_timeout())
            .with_origin(options.origin()?)
            .with_proxy(options.proxy_url()?))
    }

    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_proxy(mut self, proxy: Option<Url>) -> Self {
        self.proxy = proxy;
        self
    }

    fn is_same_origin(&self, url: &Url) -> bool {
        self.origin
            .as_ref()
            .is_some_and(|o| o.origin() == url.origin())
    }

    fn proxied(&self, target: &str) -> Option<Url> {
        let mut proxy = self.proxy.clone()?;
        proxy.query_pairs_mut().append_pair("url", target);
        Some(proxy)
    }

    fn fetch(&self, url: &str) -> Result<DynamicImage> {
        let failed = |reason: String| KeyprintError::ImageLoad {
            reference: url.to_string(),
            reason,
        };
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| failed(e.to_string()))?;
        let mut bytes = Vec::new();
        response
            .into_reader()
            .take(MAX_IMAGE_BYTES)
            .read_to_end(&mut bytes)
            .map_err(|e| failed(e.to_string()))?;
        image::load_from_memory(&bytes).map_err(|e| failed(e.to_string()))
    }
}

impl ImageLoader for HttpImageLoader {
    fn load(&self, reference: &str) -> Result<DynamicImage> {
        if reference.starts_with("data:") {
            return decode_data_uri(reference);
        }

        let url = Url::parse(reference).map_err(|e| KeyprintError::ImageLoad {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(KeyprintError::ImageLoad {
                reference: reference.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if self.is_same_origin(&url) {
            return self.fetch(reference);
        }
        match self.proxied(reference) {
            Some(proxy) => self.fetch(proxy.as_str()).or_else(|e| {
                log::warn!("Proxy load failed ({e}), trying {reference} directly");
                self.fetch(reference)
            }),
            None => self.fetch(reference),
        }
    }
}
