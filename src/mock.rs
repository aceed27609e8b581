//! Mock transport for testing: canned responses keyed by URL, plus a log of
//! every request made through it.
//!
//! ```ignore
//! use thstrader::mock::MockTransport;
//!
//! let transport = MockTransport::builder()
//!     .reply("http://portal/balance", "<td id=\"zzc\">100.00</td>")
//!     .reply("http://portal/cancel", r#"{"errorcode": 0}"#)
//!     .build();
//! ```

use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::error::{Result, TraderError};
use crate::Transport;

/// A recorded request for assertion in tests.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl RecordedRequest {
    /// The value of form field `key`, if the request carried one.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Builder for `MockTransport`.
pub struct MockTransportBuilder {
    replies: FxHashMap<String, String>,
}

impl MockTransportBuilder {
    /// Serve `body` for any request to `url`.
    pub fn reply(mut self, url: &str, body: &str) -> Self {
        self.replies.insert(url.to_string(), body.to_string());
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            replies: self.replies,
            requests: Mutex::new(Vec::new()),
        }
    }
}

/// A transport that answers from canned bodies and records every request.
/// URLs without a canned body fail like a dead connection would.
pub struct MockTransport {
    replies: FxHashMap<String, String>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            replies: FxHashMap::default(),
        }
    }

    /// All requests made so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The requests made to one URL, in order.
    pub fn requests_to(&self, url: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url == url)
            .collect()
    }

    fn record(&self, method: &'static str, url: &str, params: &[(&str, String)]) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            params: params
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        });
    }

    fn reply_for(&self, url: &str) -> Result<String> {
        self.replies
            .get(url)
            .cloned()
            .ok_or_else(|| TraderError::Transport(format!("mock: no canned response for {url}")))
    }
}

impl Transport for MockTransport {
    fn get(&self, url: &str) -> Result<String> {
        self.record("GET", url, &[]);
        self.reply_for(url)
    }

    fn post(&self, url: &str, params: &[(&str, String)]) -> Result<String> {
        self.record("POST", url, params);
        self.reply_for(url)
    }
}
