use crate::db::Database;
use crate::error::AppResult;
use crate::models::api_config::{ApiConfig, SaveApiConfigForm, CONFIG_ROW_ID};

/// Storage for the single automation-engine configuration record.
pub struct ApiConfigService<'a> {
    db: &'a Database,
}

impl<'a> ApiConfigService<'a> {
    pub fn new(db: &'a Database) -> Self {
        ApiConfigService { db }
    }

    pub async fn get_config(&self) -> AppResult<Option<ApiConfig>> {
        let result = sqlx::query_as::<_, ApiConfig>(
            r#"
            SELECT id, api_url, api_key, refresh_interval, notifications_enabled
            FROM api_config
            WHERE id = ?
            "#,
        )
        .bind(CONFIG_ROW_ID)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    /// Creates the record on first save, otherwise merges `form` onto the
    /// stored one. The write is a single upsert on the fixed row id.
    pub async fn save_config(&self, form: SaveApiConfigForm) -> AppResult<ApiConfig> {
        let config = match self.get_config().await? {
            Some(mut existing) => {
                existing.merge(form);
                existing
            }
            None => ApiConfig::create(form)?,
        };

        sqlx::query(
            r#"
            INSERT INTO api_config (id, api_url, api_key, refresh_interval, notifications_enabled)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                api_url = excluded.api_url,
                api_key = excluded.api_key,
                refresh_interval = excluded.refresh_interval,
                notifications_enabled = excluded.notifications_enabled
            "#,
        )
        .bind(CONFIG_ROW_ID)
        .bind(&config.api_url)
        .bind(&config.api_key)
        .bind(config.refresh_interval)
        .bind(config.notifications_enabled)
        .execute(&self.db.pool)
        .await?;

        tracing::info!("n8n configuration saved for {}", config.api_url);
        Ok(config)
    }
}
