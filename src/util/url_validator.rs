use std::net::IpAddr;

use thiserror::Error;
use url::Url;

/// Why a partner link was refused.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid link: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https links are opened)")]
    UnsupportedScheme(String),
    #[error("Link has no host")]
    MissingHost,
    #[error("Link points at a local or private address: {0}")]
    LocalAddress(String),
}

/// Validate a partner `link` before passing it to the system browser.
///
/// Partner data is remote JSON, so a link is only opened when it is an
/// absolute `http`/`https` URL naming a public host. `file:`, `javascript:`
/// and custom schemes are refused, as are loopback and private-range IPs.
///
/// ```
/// use retroflix::util::validate_link;
///
/// assert!(validate_link("https://www.example.com/watch").is_ok());
/// assert!(validate_link("javascript:alert(1)").is_err());
/// assert!(validate_link("http://192.168.0.10/").is_err());
/// ```
pub fn validate_link(link: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(link.trim())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedScheme(url.scheme().to_owned()));
    }

    let host = url.host_str().ok_or(UrlValidationError::MissingHost)?;
    if host.eq_ignore_ascii_case("localhost") {
        return Err(UrlValidationError::LocalAddress(host.to_owned()));
    }

    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if let Ok(ip) = bare.parse::<IpAddr>() {
        if is_local_ip(&ip) {
            return Err(UrlValidationError::LocalAddress(ip.to_string()));
        }
    }

    Ok(url)
}

fn is_local_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback() || v4.is_private() || v4.is_link_local() || v4.is_unspecified()
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
        }
    }
}
