use crate::types::{ProxyError, Result};
use std::net::{Ipv4Addr, Ipv6Addr};
use url::{Host, Url};

/// Parse and vet a proxy target. Only public http(s) hosts pass.
pub fn validate_target(target: Option<&str>) -> Result<Url> {
    let target = target
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ProxyError::MissingUrl)?;
    let url = Url::parse(target).map_err(|_| ProxyError::InvalidUrl)?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ProxyError::UnsupportedScheme);
    }
    match url.host() {
        None => Err(ProxyError::InvalidUrl),
        Some(host) if is_blocked_host(&host) => Err(ProxyError::BlockedHost),
        Some(_) => Ok(url),
    }
}

/// Loopback, private, link-local and unspecified addresses, plus `localhost`
pub fn is_blocked_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(name) => {
            let name = name.trim_end_matches('.').to_ascii_lowercase();
            name == "localhost" || name.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_blocked_v4(ip),
        Host::Ipv6(ip) => is_blocked_v6(ip),
    }
}

fn is_blocked_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

fn is_blocked_v6(ip: &Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_blocked_v4(&v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
}
