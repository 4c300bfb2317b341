use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::alert::{CreateAlertForm, NewWorkflowAlert, UpdateAlertForm};
use crate::services::AlertService;
use crate::state::AppState;

// GET / - All alert rules
async fn list_alerts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let alerts = AlertService::new(&state.db).list_alerts().await?;
    Ok(HttpResponse::Ok().json(alerts))
}

// GET /{id}
async fn get_alert(state: web::Data<AppState>, id: web::Path<i64>) -> AppResult<HttpResponse> {
    let alert = AlertService::new(&state.db)
        .get_alert(*id)
        .await?
        .ok_or_else(|| AppError::NotFound("Workflow alert not found".to_string()))?;

    Ok(HttpResponse::Ok().json(alert))
}

// POST / - Create an alert rule
async fn create_alert(
    state: web::Data<AppState>,
    form: web::Json<CreateAlertForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let alert = AlertService::new(&state.db)
        .create_alert(NewWorkflowAlert::from(form.into_inner()))
        .await?;

    Ok(HttpResponse::Created().json(alert))
}

// PATCH /{id} - Partial update
async fn update_alert(
    state: web::Data<AppState>,
    id: web::Path<i64>,
    form: web::Json<UpdateAlertForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let alert = AlertService::new(&state.db)
        .update_alert(*id, form.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(alert))
}

// DELETE /{id} - Missing ids are not an error
async fn delete_alert(state: web::Data<AppState>, id: web::Path<i64>) -> AppResult<HttpResponse> {
    AlertService::new(&state.db).delete_alert(*id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(list_alerts))
        .route("", web::post().to(create_alert))
        .route("/{id}", web::get().to(get_alert))
        .route("/{id}", web::patch().to(update_alert))
        .route("/{id}", web::delete().to(delete_alert));
}
