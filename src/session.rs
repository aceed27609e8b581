//! Authenticated portal session over blocking HTTP.
//!
//! The portal has no API tokens; authentication is a browser cookie string
//! captured after a manual login. Every request replays that cookie plus the
//! fixed header set of the portal's own XHR client.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};

use crate::error::{Result, TraderError};
use crate::Transport;

/// Headers the portal front end sends on every XHR call. `Host` and the
/// connection-level headers are left to the HTTP stack.
const PORTAL_HEADERS: [(&str, &str); 9] = [
    ("Accept", "application/json, text/javascript, */*; q=0.01"),
    (
        "Accept-Language",
        "en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7,fr;q=0.6",
    ),
    ("Cache-Control", "no-cache"),
    (
        "Content-Type",
        "application/x-www-form-urlencoded; charset=UTF-8",
    ),
    ("Origin", "http://mncg.10jqka.com.cn"),
    ("Pragma", "no-cache"),
    (
        "Referer",
        "http://mncg.10jqka.com.cn/cgiwt/index/index",
    ),
    (
        "User-Agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_4) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/73.0.3683.103 Safari/537.36",
    ),
    ("X-Requested-With", "XMLHttpRequest"),
];

/// Parse a browser cookie string (`name=value; name2=value2`) into pairs.
///
/// Fragments without `=` (attribute flags such as `Secure`) are skipped.
pub fn parse_cookie_str(cookies: &str) -> Vec<(String, String)> {
    cookies
        .split(';')
        .filter_map(|fragment| {
            let (name, value) = fragment.trim().split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Live portal transport: a cookie-authenticated blocking HTTP client.
pub struct Session {
    client: Client,
}

impl Session {
    /// Build a session from a captured cookie string.
    ///
    /// `timeout` bounds each round-trip; `None` waits indefinitely. The
    /// portal's certificate chain does not validate, so verification is
    /// disabled the same way the portal's own client disables it.
    pub fn new(cookies: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in PORTAL_HEADERS {
            headers.insert(name, HeaderValue::from_static(value));
        }

        let cookie_header = parse_cookie_str(cookies)
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        let cookie_value = HeaderValue::from_str(&cookie_header)
            .map_err(|e| TraderError::Transport(format!("invalid cookie string: {e}")))?;
        headers.insert(COOKIE, cookie_value);

        let mut builder = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TraderError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Session { client })
    }
}

impl Transport for Session {
    fn get(&self, url: &str) -> Result<String> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TraderError::Transport(format!("GET {url} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TraderError::Transport(format!(
                "GET {url} returned {status}"
            )));
        }
        response
            .text()
            .map_err(|e| TraderError::Transport(format!("failed to read body of {url}: {e}")))
    }

    fn post(&self, url: &str, params: &[(&str, String)]) -> Result<String> {
        debug!("POST {url} ({} fields)", params.len());
        let response = self
            .client
            .post(url)
            .form(params)
            .send()
            .map_err(|e| TraderError::Transport(format!("POST {url} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TraderError::Transport(format!(
                "POST {url} returned {status}"
            )));
        }
        response
            .text()
            .map_err(|e| TraderError::Transport(format!("failed to read body of {url}: {e}")))
    }
}
