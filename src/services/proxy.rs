use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::api_config::ApiConfig;
use crate::models::webhook_test::{WebhookTest, WebhookTestResult};
use crate::services::transport::{HttpTransport, OutboundRequest};

/// Header the automation engine reads its API key from.
pub const API_KEY_HEADER: &str = "X-N8N-API-KEY";

pub const DEFAULT_EXECUTION_LIMIT: u32 = 20;
pub const DEFAULT_EXECUTION_OFFSET: u32 = 0;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("upstream responded with status {status}")]
    Status { status: u16, body: Value },

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Pagination and filtering forwarded verbatim to the engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionListQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub workflow_id: Option<String>,
}

/// Outbound calls to the automation engine and to fixture targets.
#[derive(Clone)]
pub struct ProxyClient {
    transport: Arc<dyn HttpTransport>,
}

impl ProxyClient {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        ProxyClient { transport }
    }

    pub async fn list_workflows(&self, config: &ApiConfig) -> Result<Value, ProxyError> {
        self.engine_call(config, Method::GET, &["workflows"], Vec::new())
            .await
    }

    pub async fn get_workflow(&self, config: &ApiConfig, id: &str) -> Result<Value, ProxyError> {
        self.engine_call(config, Method::GET, &["workflows", id], Vec::new())
            .await
    }

    pub async fn activate_workflow(
        &self,
        config: &ApiConfig,
        id: &str,
    ) -> Result<Value, ProxyError> {
        self.engine_call(config, Method::POST, &["workflows", id, "activate"], Vec::new())
            .await
    }

    pub async fn deactivate_workflow(
        &self,
        config: &ApiConfig,
        id: &str,
    ) -> Result<Value, ProxyError> {
        self.engine_call(config, Method::POST, &["workflows", id, "deactivate"], Vec::new())
            .await
    }

    pub async fn execute_workflow(
        &self,
        config: &ApiConfig,
        id: &str,
    ) -> Result<Value, ProxyError> {
        self.engine_call(config, Method::POST, &["workflows", id, "execute"], Vec::new())
            .await
    }

    pub async fn list_executions(
        &self,
        config: &ApiConfig,
        query: &ExecutionListQuery,
    ) -> Result<Value, ProxyError> {
        let mut params = vec![
            (
                "limit".to_string(),
                query.limit.unwrap_or(DEFAULT_EXECUTION_LIMIT).to_string(),
            ),
            (
                "offset".to_string(),
                query.offset.unwrap_or(DEFAULT_EXECUTION_OFFSET).to_string(),
            ),
        ];
        if let Some(workflow_id) = &query.workflow_id {
            params.push(("workflowId".to_string(), workflow_id.clone()));
        }

        self.engine_call(config, Method::GET, &["executions"], params)
            .await
    }

    pub async fn get_execution(&self, config: &ApiConfig, id: &str) -> Result<Value, ProxyError> {
        self.engine_call(config, Method::GET, &["executions", id], Vec::new())
            .await
    }

    async fn engine_call(
        &self,
        config: &ApiConfig,
        method: Method,
        segments: &[&str],
        query: Vec<(String, String)>,
    ) -> Result<Value, ProxyError> {
        let url = engine_url(config, segments)?;

        let mut request = OutboundRequest::new(method, url).header(API_KEY_HEADER, &config.api_key);
        for (name, value) in query {
            request = request.query(name, value);
        }

        debug!("Proxying {:?}", request);

        let response = self
            .transport
            .send(request)
            .await
            .map_err(ProxyError::Transport)?;

        if response.is_success() {
            Ok(response.body_value())
        } else {
            Err(ProxyError::Status {
                status: response.status,
                body: response.body_value(),
            })
        }
    }

    /// Replays a stored fixture. Any status the target answers with is a
    /// successful outcome; only the absence of a response is an error.
    pub async fn execute_fixture(&self, fixture: &WebhookTest) -> AppResult<WebhookTestResult> {
        let method = Method::from_bytes(fixture.method.as_bytes())
            .map_err(|e| AppError::Internal(format!("Stored method is invalid: {}", e)))?;
        let url = Url::parse(&fixture.url)
            .map_err(|e| AppError::Internal(format!("Stored url is invalid: {}", e)))?;

        let mut request = OutboundRequest::new(method, url);
        for (name, value) in &fixture.headers {
            request = request.header(name, value);
        }
        if let Some(body) = fixture.json_body()? {
            request = request.json(body);
        }

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("Webhook test {} failed: {}", fixture.id, e);
            AppError::upstream("Failed to execute webhook test", ProxyError::Transport(e))
        })?;

        Ok(WebhookTestResult {
            status: response.status,
            status_text: response.status_text.clone(),
            data: response.body_value(),
            headers: response.headers,
        })
    }
}

/// Appends path segments to the configured base URL, escaping each one.
fn engine_url(config: &ApiConfig, segments: &[&str]) -> Result<Url, ProxyError> {
    let mut url = Url::parse(config.base_url())
        .map_err(|e| ProxyError::Transport(format!("Invalid apiUrl: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| ProxyError::Transport("apiUrl cannot be a base URL".to_string()))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::webhook_test::HeaderMap;
    use crate::services::transport::testing::RecordingTransport;
    use chrono::Utc;
    use serde_json::json;

    fn config() -> ApiConfig {
        ApiConfig {
            id: 1,
            api_url: "https://x.test/api/v1/".to_string(),
            api_key: "secret".to_string(),
            refresh_interval: 60,
            notifications_enabled: true,
        }
    }

    fn fixture(body: Option<&str>) -> WebhookTest {
        let mut headers = HeaderMap::new();
        headers.insert("X-Trace".to_string(), "abc".to_string());
        WebhookTest {
            id: 3,
            name: "teapot".to_string(),
            url: "https://hooks.test/teapot".to_string(),
            method: "GET".to_string(),
            headers,
            body: body.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn test_engine_call_attaches_key_and_builds_url() {
        let transport = Arc::new(RecordingTransport::responding(200, json!({"data": []})));
        let proxy = ProxyClient::new(transport.clone());

        let body = proxy.activate_workflow(&config(), "wf 1").await.unwrap();
        assert_eq!(body, json!({"data": []}));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, Method::POST);
        assert_eq!(
            calls[0].url.as_str(),
            "https://x.test/api/v1/workflows/wf%201/activate"
        );
        assert!(calls[0]
            .headers
            .contains(&(API_KEY_HEADER.to_string(), "secret".to_string())));
    }

    #[actix_web::test]
    async fn test_execution_query_passthrough() {
        let transport = Arc::new(RecordingTransport::responding(200, json!({"data": []})));
        let proxy = ProxyClient::new(transport.clone());

        let query = ExecutionListQuery {
            limit: Some(5),
            offset: None,
            workflow_id: Some("wf-9".to_string()),
        };
        proxy.list_executions(&config(), &query).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].url.as_str(), "https://x.test/api/v1/executions");
        assert_eq!(
            calls[0].query,
            vec![
                ("limit".to_string(), "5".to_string()),
                ("offset".to_string(), "0".to_string()),
                ("workflowId".to_string(), "wf-9".to_string()),
            ]
        );
    }

    #[actix_web::test]
    async fn test_engine_error_status_is_upstream_failure() {
        let transport = Arc::new(RecordingTransport::responding(
            401,
            json!({"message": "unauthorized"}),
        ));
        let proxy = ProxyClient::new(transport);

        match proxy.list_workflows(&config()).await {
            Err(ProxyError::Status { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body["message"], "unauthorized");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn test_engine_transport_failure() {
        let proxy = ProxyClient::new(Arc::new(RecordingTransport::unreachable(
            "connection refused",
        )));

        match proxy.list_workflows(&config()).await {
            Err(ProxyError::Transport(message)) => assert_eq!(message, "connection refused"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn test_fixture_error_status_is_reported() {
        let transport = Arc::new(RecordingTransport::responding(418, json!({"ok": false})));
        let proxy = ProxyClient::new(transport.clone());

        let result = proxy.execute_fixture(&fixture(None)).await.unwrap();
        assert_eq!(result.status, 418);
        assert_eq!(result.status_text, "I'm a teapot");
        assert_eq!(result.data, json!({"ok": false}));

        let calls = transport.calls();
        assert_eq!(calls[0].method, Method::GET);
        assert_eq!(calls[0].json_body, None);
        assert!(calls[0]
            .headers
            .contains(&("X-Trace".to_string(), "abc".to_string())));
    }

    #[actix_web::test]
    async fn test_fixture_sends_parsed_body() {
        let transport = Arc::new(RecordingTransport::responding(200, json!({})));
        let proxy = ProxyClient::new(transport.clone());

        proxy
            .execute_fixture(&fixture(Some("{\"event\": \"ping\"}")))
            .await
            .unwrap();
        assert_eq!(transport.calls()[0].json_body, Some(json!({"event": "ping"})));
    }

    #[actix_web::test]
    async fn test_fixture_invalid_body_fails_before_sending() {
        let transport = Arc::new(RecordingTransport::responding(200, json!({})));
        let proxy = ProxyClient::new(transport.clone());

        let err = proxy
            .execute_fixture(&fixture(Some("{broken")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidBody(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_fixture_unreachable_is_transport_failure() {
        let proxy = ProxyClient::new(Arc::new(RecordingTransport::unreachable("dns error")));

        match proxy.execute_fixture(&fixture(None)).await {
            Err(AppError::Upstream { status, detail, .. }) => {
                assert_eq!(status, None);
                assert_eq!(detail, json!("dns error"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
