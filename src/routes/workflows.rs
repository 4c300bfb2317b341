use actix_web::{web, HttpResponse};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::routes::require_config;
use crate::state::AppState;

// GET / - Workflow list from the automation engine
async fn list_workflows(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let config = require_config(&state).await?;

    let workflows = state.proxy.list_workflows(&config).await.map_err(|e| {
        warn!("Error fetching workflows: {}", e);
        AppError::upstream("Failed to fetch workflows", e)
    })?;

    Ok(HttpResponse::Ok().json(workflows))
}

// GET /{id} - Single workflow
async fn get_workflow(
    state: web::Data<AppState>,
    workflow_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let config = require_config(&state).await?;

    let workflow = state
        .proxy
        .get_workflow(&config, &workflow_id)
        .await
        .map_err(|e| {
            warn!("Error fetching workflow {}: {}", workflow_id, e);
            AppError::upstream("Failed to fetch workflow", e)
        })?;

    Ok(HttpResponse::Ok().json(workflow))
}

// POST /{id}/activate
async fn activate_workflow(
    state: web::Data<AppState>,
    workflow_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let config = require_config(&state).await?;

    let result = state
        .proxy
        .activate_workflow(&config, &workflow_id)
        .await
        .map_err(|e| {
            warn!("Error activating workflow {}: {}", workflow_id, e);
            AppError::upstream("Failed to activate workflow", e)
        })?;

    Ok(HttpResponse::Ok().json(result))
}

// POST /{id}/deactivate
async fn deactivate_workflow(
    state: web::Data<AppState>,
    workflow_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let config = require_config(&state).await?;

    let result = state
        .proxy
        .deactivate_workflow(&config, &workflow_id)
        .await
        .map_err(|e| {
            warn!("Error deactivating workflow {}: {}", workflow_id, e);
            AppError::upstream("Failed to deactivate workflow", e)
        })?;

    Ok(HttpResponse::Ok().json(result))
}

// POST /{id}/execute
async fn execute_workflow(
    state: web::Data<AppState>,
    workflow_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let config = require_config(&state).await?;

    let result = state
        .proxy
        .execute_workflow(&config, &workflow_id)
        .await
        .map_err(|e| {
            warn!("Error executing workflow {}: {}", workflow_id, e);
            AppError::upstream("Failed to execute workflow", e)
        })?;

    Ok(HttpResponse::Ok().json(result))
}

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_workflows))
        .route("/{id}", web::get().to(get_workflow))
        .route("/{id}/activate", web::post().to(activate_workflow))
        .route("/{id}/deactivate", web::post().to(deactivate_workflow))
        .route("/{id}/execute", web::post().to(execute_workflow));
}

#[cfg(test)]
mod tests {
    use crate::models::api_config::SaveApiConfigForm;
    use crate::routes::test_support::{state_with, test_app};
    use crate::services::proxy::API_KEY_HEADER;
    use crate::services::transport::testing::RecordingTransport;
    use crate::services::ApiConfigService;
    use crate::state::AppState;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn configure(state: &AppState) {
        ApiConfigService::new(&state.db)
            .save_config(SaveApiConfigForm {
                api_url: Some("https://x.test/api/v1".to_string()),
                api_key: Some("secret".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    #[actix_web::test]
    async fn test_no_config_means_no_outbound_call() {
        let transport = Arc::new(RecordingTransport::responding(200, json!({"data": []})));
        let state = state_with(transport.clone()).await;
        let app = test_app!(state);

        for (method, uri) in [
            ("GET", "/api/workflows"),
            ("GET", "/api/workflows/wf-1"),
            ("POST", "/api/workflows/wf-1/activate"),
            ("POST", "/api/workflows/wf-1/deactivate"),
            ("POST", "/api/workflows/wf-1/execute"),
        ] {
            let req = match method {
                "GET" => test::TestRequest::get(),
                _ => test::TestRequest::post(),
            }
            .uri(uri)
            .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");

            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "No n8n configuration found");
        }

        assert_eq!(transport.call_count(), 0);
    }

    #[actix_web::test]
    async fn test_list_workflows_passthrough() {
        let payload = json!({"data": [{"id": "wf-1", "name": "Nightly sync", "active": true}]});
        let transport = Arc::new(RecordingTransport::responding(200, payload.clone()));
        let state = state_with(transport.clone()).await;
        configure(&state).await;
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/api/workflows").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, payload);

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url.as_str(), "https://x.test/api/v1/workflows");
        assert!(calls[0]
            .headers
            .contains(&(API_KEY_HEADER.to_string(), "secret".to_string())));
    }

    #[actix_web::test]
    async fn test_upstream_status_is_surfaced() {
        let transport = Arc::new(RecordingTransport::responding(
            401,
            json!({"message": "X-N8N-API-KEY header required"}),
        ));
        let state = state_with(transport).await;
        configure(&state).await;
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/workflows/wf-1/activate")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Failed to activate workflow");
        assert_eq!(body["error"]["message"], "X-N8N-API-KEY header required");
        assert!(!body.to_string().contains("secret"));
    }

    #[actix_web::test]
    async fn test_unreachable_engine_is_500() {
        let transport = Arc::new(RecordingTransport::unreachable("connection refused"));
        let state = state_with(transport).await;
        configure(&state).await;
        let app = test_app!(state);

        let req = test::TestRequest::get().uri("/api/workflows").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "connection refused");
    }
}
