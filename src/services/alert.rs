use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::models::alert::{NewWorkflowAlert, UpdateAlertForm, WorkflowAlert};

pub struct AlertService<'a> {
    db: &'a Database,
}

impl<'a> AlertService<'a> {
    pub fn new(db: &'a Database) -> Self {
        AlertService { db }
    }

    pub async fn list_alerts(&self) -> AppResult<Vec<WorkflowAlert>> {
        let alerts = sqlx::query_as::<_, WorkflowAlert>(
            r#"
            SELECT id, workflow_id, workflow_name, alert_type, threshold, enabled, message, created_at
            FROM workflow_alerts
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db.pool)
        .await?;

        Ok(alerts)
    }

    pub async fn get_alert(&self, id: i64) -> AppResult<Option<WorkflowAlert>> {
        let result = sqlx::query_as::<_, WorkflowAlert>(
            r#"
            SELECT id, workflow_id, workflow_name, alert_type, threshold, enabled, message, created_at
            FROM workflow_alerts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db.pool)
        .await?;

        Ok(result)
    }

    pub async fn create_alert(&self, alert: NewWorkflowAlert) -> AppResult<WorkflowAlert> {
        let result = sqlx::query(
            r#"
            INSERT INTO workflow_alerts
                (workflow_id, workflow_name, alert_type, threshold, enabled, message, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&alert.workflow_id)
        .bind(&alert.workflow_name)
        .bind(alert.alert_type)
        .bind(alert.threshold)
        .bind(alert.enabled)
        .bind(&alert.message)
        .bind(alert.created_at)
        .execute(&self.db.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!("Created workflow alert {}", id);

        self.get_alert(id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to create workflow alert".to_string()))
    }

    pub async fn update_alert(&self, id: i64, patch: UpdateAlertForm) -> AppResult<WorkflowAlert> {
        let mut alert = self
            .get_alert(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Workflow alert with id {} not found", id)))?;

        alert.merge(patch);

        sqlx::query(
            r#"
            UPDATE workflow_alerts
            SET workflow_id = ?, workflow_name = ?, alert_type = ?, threshold = ?,
                enabled = ?, message = ?
            WHERE id = ?
            "#,
        )
        .bind(&alert.workflow_id)
        .bind(&alert.workflow_name)
        .bind(alert.alert_type)
        .bind(alert.threshold)
        .bind(alert.enabled)
        .bind(&alert.message)
        .bind(id)
        .execute(&self.db.pool)
        .await?;

        Ok(alert)
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete_alert(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM workflow_alerts WHERE id = ?")
            .bind(id)
            .execute(&self.db.pool)
            .await?;

        Ok(())
    }
}
