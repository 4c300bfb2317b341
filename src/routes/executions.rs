use actix_web::{web, HttpResponse};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::routes::require_config;
use crate::services::proxy::ExecutionListQuery;
use crate::state::AppState;

// GET /?limit&offset&workflowId - Execution list, paginated by the engine
async fn list_executions(
    state: web::Data<AppState>,
    query: web::Query<ExecutionListQuery>,
) -> AppResult<HttpResponse> {
    let config = require_config(&state).await?;

    let executions = state
        .proxy
        .list_executions(&config, &query)
        .await
        .map_err(|e| {
            warn!("Error fetching executions: {}", e);
            AppError::upstream("Failed to fetch executions", e)
        })?;

    Ok(HttpResponse::Ok().json(executions))
}

// GET /{id} - Single execution
async fn get_execution(
    state: web::Data<AppState>,
    execution_id: web::Path<String>,
) -> AppResult<HttpResponse> {
    let config = require_config(&state).await?;

    let execution = state
        .proxy
        .get_execution(&config, &execution_id)
        .await
        .map_err(|e| {
            warn!("Error fetching execution {}: {}", execution_id, e);
            AppError::upstream("Failed to fetch execution", e)
        })?;

    Ok(HttpResponse::Ok().json(execution))
}

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_executions))
        .route("/{id}", web::get().to(get_execution));
}
