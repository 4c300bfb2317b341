use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::api_config::{ApiConfigResponse, SaveApiConfigForm};
use crate::services::ApiConfigService;
use crate::state::AppState;

// GET / - Stored configuration with the API key masked
async fn get_config(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let config = ApiConfigService::new(&state.db)
        .get_config()
        .await?
        .ok_or(AppError::ConfigurationMissing)?;

    Ok(HttpResponse::Ok().json(ApiConfigResponse::from(config)))
}

// POST / - Create or update the configuration
async fn save_config(
    state: web::Data<AppState>,
    form: web::Json<SaveApiConfigForm>,
) -> AppResult<HttpResponse> {
    form.validate()?;

    let config = ApiConfigService::new(&state.db)
        .save_config(form.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(ApiConfigResponse::from(config)))
}

pub fn create_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(get_config))
        .route("", web::post().to(save_config));
}
