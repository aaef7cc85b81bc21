use crate::types::{ProxyError, Result};
use std::io::Read;
use std::time::Duration;
use url::Url;

/// Largest upstream body relayed
const MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Body and metadata relayed back to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// `Location` header of a redirect, left for the caller to vet
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308) && self.location.is_some()
    }
}

/// Fetches a vetted target without following redirects. Called from a
/// blocking thread.
pub trait Upstream: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<UpstreamResponse>;
}

pub struct UreqUpstream {
    agent: ureq::Agent,
}

impl UreqUpstream {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(timeout)
                .user_agent("keyprint-proxy")
                // Each hop is vetted by the server before it is fetched
                .redirects(0)
                .build(),
        }
    }
}

impl Default for UreqUpstream {
    fn default() -> Self {
        Self::new(Duration::from_secs(20))
    }
}

impl Upstream for UreqUpstream {
    fn fetch(&self, url: &Url) -> Result<UpstreamResponse> {
        // Non-2xx statuses are relayed as-is
        let response = match self.agent.get(url.as_str()).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(ProxyError::Upstream(e.to_string())),
        };

        let status = response.status();
        let content_type = response.header("content-type").map(str::to_string);
        let location = response.header("location").map(str::to_string);
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| ProxyError::Upstream(e.to_string()))?;

        Ok(UpstreamResponse {
            status,
            content_type,
            location,
            body,
        })
    }
}
