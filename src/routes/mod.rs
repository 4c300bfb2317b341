pub mod executions;
pub mod health;
pub mod n8n_config;
pub mod workflow_alerts;
pub mod workflows;

use actix_web::{
    error::{JsonPayloadError, QueryPayloadError},
    web, HttpRequest,
};

use crate::error::{AppError, AppResult};
use crate::models::api_config::ApiConfig;
use crate::services::ApiConfigService;
use crate::state::AppState;

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .configure(health::create_routes)
        .service(
            web::scope("/api")
                .service(web::scope("/n8n-config").configure(n8n_config::create_routes))
                .service(web::scope("/workflows").configure(workflows::create_routes))
                .service(web::scope("/executions").configure(executions::create_routes))
                .service(web::scope("/workflow-alerts").configure(workflow_alerts::create_routes))
                .service(web::scope("/webhook-tests").configure(webhook_tests::create_routes)),
        );
}

/// Malformed JSON bodies get the same 400 shape as validation failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        let (code, message) = match &err {
            JsonPayloadError::Deserialize(e) => ("schema", e.to_string()),
            JsonPayloadError::ContentType => (
                "content_type",
                "Content-Type must be application/json".to_string(),
            ),
            other => ("payload", other.to_string()),
        };
        AppError::invalid_field("body", code, message).into()
    })
}

/// Unparseable query strings (e.g. `limit=abc`) get the same 400 shape.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let message = match &err {
            QueryPayloadError::Deserialize(e) => e.to_string(),
            other => other.to_string(),
        };
        AppError::invalid_field("query", "schema", message).into()
    })
}

/// Loads the stored configuration or fails with `ConfigurationMissing`,
/// before any outbound call is attempted.
pub(crate) async fn require_config(state: &AppState) -> AppResult<ApiConfig> {
    ApiConfigService::new(&state.db)
        .get_config()
        .await?
        .ok_or(AppError::ConfigurationMissing)
}
