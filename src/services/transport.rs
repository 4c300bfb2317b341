use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// An outbound HTTP request, independent of the client library.
#[derive(Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: reqwest::Url,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub json_body: Option<Value>,
}

// Header values may carry credentials, so only the target is printed.
impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl OutboundRequest {
    pub fn new(method: Method, url: reqwest::Url) -> Self {
        OutboundRequest {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            json_body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json_body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl OutboundResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parsed JSON when possible, otherwise the body as text. An empty body
    /// is `null`.
    pub fn body_value(&self) -> Value {
        if self.body.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&self.body).into_owned()))
    }
}

/// Sends requests and returns whatever the far end answered. Only a missing
/// response (DNS, refused connection, timeout, invalid request) is an error.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<OutboundResponse, String>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(ReqwestTransport { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<OutboundResponse, String> {
        debug!("Sending {} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method, request.url)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.json_body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                format!("Request timed out: {}", e)
            } else {
                e.to_string()
            }
        })?;

        let status = response.status();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.to_string())
                    .and_modify(|existing: &mut String| {
                        existing.push_str(", ");
                        existing.push_str(value);
                    })
                    .or_insert_with(|| value.to_string());
            }
        }

        let body = response.bytes().await.map_err(|e| e.to_string())?;

        Ok(OutboundResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every request and answers with a fixed reply.
    pub struct RecordingTransport {
        reply: Result<OutboundResponse, String>,
        calls: Mutex<Vec<OutboundRequest>>,
    }

    impl RecordingTransport {
        pub fn responding(status: u16, body: Value) -> Self {
            let status_text = reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
                .unwrap_or("")
                .to_string();
            let mut headers = BTreeMap::new();
            headers.insert("content-type".to_string(), "application/json".to_string());

            RecordingTransport {
                reply: Ok(OutboundResponse {
                    status,
                    status_text,
                    headers,
                    body: serde_json::to_vec(&body).unwrap(),
                }),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn unreachable(message: &str) -> Self {
            RecordingTransport {
                reply: Err(message.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<OutboundRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn send(&self, request: OutboundRequest) -> Result<OutboundResponse, String> {
            self.calls.lock().unwrap().push(request);
            self.reply.clone()
        }
    }
}
