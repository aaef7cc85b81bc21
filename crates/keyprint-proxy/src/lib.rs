//! Image relay for the kiosk
//!
//! Browsers and the export rasterizer cannot always read third-party images
//! directly. This service fetches a public http(s) image on their behalf and
//! returns it with permissive CORS headers. Targets on loopback, private or
//! link-local networks are refused.

mod guard;
mod server;
mod types;
mod upstream;

pub use guard::{is_blocked_host, validate_target};
pub use server::{MAX_REDIRECTS, PROXY_PATH, router, serve};
pub use types::*;
pub use upstream::{Upstream, UpstreamResponse, UreqUpstream};
