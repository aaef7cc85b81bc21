use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Missing url")]
    MissingUrl,

    #[error("Invalid url")]
    InvalidUrl,

    #[error("Only http/https allowed")]
    UnsupportedScheme,

    #[error("Blocked host")]
    BlockedHost,

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl
            | ProxyError::InvalidUrl
            | ProxyError::UnsupportedScheme
            | ProxyError::BlockedHost => StatusCode::BAD_REQUEST,
            ProxyError::TooManyRedirects | ProxyError::Upstream(_) | ProxyError::TaskJoin(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::BAD_GATEWAY {
            log::warn!("{self}");
            (status, "Proxy error").into_response()
        } else {
            log::debug!("Rejected proxy request: {self}");
            (status, self.to_string()).into_response()
        }
    }
}
