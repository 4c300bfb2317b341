use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};

/// Placeholder returned instead of the stored API key.
pub const MASKED_API_KEY: &str = "••••••••••••••••••••••";

pub const DEFAULT_REFRESH_INTERVAL: i64 = 60;
pub const DEFAULT_NOTIFICATIONS_ENABLED: bool = true;

/// The only row id the configuration table accepts.
pub const CONFIG_ROW_ID: i64 = 1;

#[derive(Clone, PartialEq, FromRow)]
pub struct ApiConfig {
    pub id: i64,
    pub api_url: String,
    pub api_key: String,
    pub refresh_interval: i64,
    pub notifications_enabled: bool,
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("id", &self.id)
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("refresh_interval", &self.refresh_interval)
            .field("notifications_enabled", &self.notifications_enabled)
            .finish()
    }
}

#[derive(Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveApiConfigForm {
    #[validate(url(message = "apiUrl must be a valid absolute URL"))]
    pub api_url: Option<String>,

    #[validate(
        length(min = 1, message = "apiKey must not be empty"),
        custom(function = "reject_masked_key")
    )]
    pub api_key: Option<String>,

    #[validate(range(min = 0, message = "refreshInterval must be a non-negative integer"))]
    pub refresh_interval: Option<i64>,

    pub notifications_enabled: Option<bool>,
}

fn reject_masked_key(key: &str) -> Result<(), ValidationError> {
    if key == MASKED_API_KEY {
        let mut err = ValidationError::new("masked");
        err.message = Some("apiKey must be the real key, not the masked placeholder".into());
        return Err(err);
    }
    Ok(())
}

impl ApiConfig {
    /// Builds the first configuration record. `apiUrl` and `apiKey` have no
    /// defaults and must be present.
    pub fn create(form: SaveApiConfigForm) -> AppResult<Self> {
        let api_url = form.api_url.ok_or_else(|| {
            AppError::invalid_field("apiUrl", "required", "apiUrl is required")
        })?;
        let api_key = form.api_key.ok_or_else(|| {
            AppError::invalid_field("apiKey", "required", "apiKey is required")
        })?;

        Ok(ApiConfig {
            id: CONFIG_ROW_ID,
            api_url,
            api_key,
            refresh_interval: form.refresh_interval.unwrap_or(DEFAULT_REFRESH_INTERVAL),
            notifications_enabled: form
                .notifications_enabled
                .unwrap_or(DEFAULT_NOTIFICATIONS_ENABLED),
        })
    }

    /// Field-by-field merge; absent fields keep their stored value.
    pub fn merge(&mut self, form: SaveApiConfigForm) {
        if let Some(api_url) = form.api_url {
            self.api_url = api_url;
        }
        if let Some(api_key) = form.api_key {
            self.api_key = api_key;
        }
        if let Some(refresh_interval) = form.refresh_interval {
            self.refresh_interval = refresh_interval;
        }
        if let Some(notifications_enabled) = form.notifications_enabled {
            self.notifications_enabled = notifications_enabled;
        }
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConfigResponse {
    pub id: i64,
    pub api_url: String,
    pub api_key: String,
    pub refresh_interval: i64,
    pub notifications_enabled: bool,
}

impl From<ApiConfig> for ApiConfigResponse {
    fn from(config: ApiConfig) -> Self {
        ApiConfigResponse {
            id: config.id,
            api_url: config.api_url,
            api_key: if config.api_key.is_empty() {
                String::new()
            } else {
                MASKED_API_KEY.to_string()
            },
            refresh_interval: config.refresh_interval,
            notifications_enabled: config.notifications_enabled,
        }
    }
}
