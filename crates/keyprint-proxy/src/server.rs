use crate::guard::validate_target;
use crate::types::{ProxyError, Result};
use crate::upstream::{Upstream, UpstreamResponse};
use axum::extract::{Query, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub const PROXY_PATH: &str = "/api/proxy";

/// Redirect hops followed before giving up
pub const MAX_REDIRECTS: usize = 5;

#[derive(Clone)]
struct ProxyState {
    upstream: Arc<dyn Upstream>,
}

#[derive(Debug, Deserialize)]
struct ProxyQuery {
    url: Option<String>,
}

/// `GET /api/proxy?url=<target>` with permissive CORS
pub fn router(upstream: Arc<dyn Upstream>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route(PROXY_PATH, get(proxy))
        .with_state(ProxyState { upstream })
        .layer(cors)
}

/// Bind and serve until the process exits
pub async fn serve(addr: SocketAddr, upstream: Arc<dyn Upstream>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Image proxy listening on http://{}{}", listener.local_addr()?, PROXY_PATH);
    axum::serve(listener, router(upstream)).await
}

async fn proxy(State(state): State<ProxyState>, Query(query): Query<ProxyQuery>) -> Result<Response> {
    let target = validate_target(query.url.as_deref())?;
    log::debug!("Proxying {target}");

    let upstream = state.upstream.clone();
    let fetched =
        tokio::task::spawn_blocking(move || fetch_vetted(upstream.as_ref(), target)).await??;

    let status = StatusCode::from_u16(fetched.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = (status, fetched.body).into_response();
    let headers = response.headers_mut();
    if let Some(content_type) = fetched
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
    {
        headers.insert(header::CONTENT_TYPE, content_type);
    }
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    Ok(response)
}

/// Fetch, following redirects only to targets that pass the same guard
fn fetch_vetted(upstream: &dyn Upstream, mut target: url::Url) -> Result<UpstreamResponse> {
    for _ in 0..=MAX_REDIRECTS {
        let fetched = upstream.fetch(&target)?;
        if !fetched.is_redirect() {
            return Ok(fetched);
        }
        let location = fetched.location.as_deref().unwrap_or_default();
        let next = target.join(location).map_err(|_| ProxyError::InvalidUrl)?;
        target = validate_target(Some(next.as_str())).inspect_err(|e| {
            log::warn!("Refused redirect to {next}: {e}");
        })?;
        log::debug!("Following redirect to {target}");
    }
    Err(ProxyError::TooManyRedirects)
}
