//! Scripted transport for tests.
//!
//! Responses are queued per request key (`url` or `url?k=v&...`) and handed
//! out in order. A request with nothing left in its queue gets a 404.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::transport::{HttpTransport, TransportError, TransportResponse};

type Scripted = Result<TransportResponse, TransportError>;

/// A request observed by the scripted transport.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub key: String,
    pub timeout: Duration,
    pub at: Instant,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Request key for a URL and its query parameters.
pub fn request_key(url: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{url}?{}", query.join("&"))
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one response for `key`.
    pub fn route(self, key: impl Into<String>, response: Scripted) -> Self {
        {
            let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
            routes.entry(key.into()).or_default().push_back(response);
        }
        self
    }

    /// Queue a 200 response with a JSON body.
    pub fn json(self, key: impl Into<String>, body: serde_json::Value) -> Self {
        self.route(key, Ok(TransportResponse::ok(body.to_string())))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Time between consecutive calls.
    pub fn gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|pair| pair[1].at.duration_since(pair[0].at))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let key = request_key(url, params);
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                key: key.clone(),
                timeout,
                at: Instant::now(),
            });

        let next = self
            .routes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        next.unwrap_or_else(|| Ok(TransportResponse::new(404, "")))
    }
}
