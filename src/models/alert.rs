use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Occurrence count stored when a rule is created without one.
pub const DEFAULT_THRESHOLD: i64 = 1;
pub const DEFAULT_ENABLED: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AlertType {
    Failure,
    Success,
    PartialSuccess,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowAlert {
    pub id: i64,
    pub workflow_id: String,
    pub workflow_name: String,
    pub alert_type: AlertType,
    pub threshold: i64,
    pub enabled: bool,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertForm {
    #[validate(length(min = 1, message = "workflowId must not be empty"))]
    pub workflow_id: String,

    #[validate(length(min = 1, message = "workflowName must not be empty"))]
    pub workflow_name: String,

    pub alert_type: AlertType,

    #[validate(range(min = 1, message = "threshold must be a positive integer"))]
    pub threshold: Option<i64>,

    pub enabled: Option<bool>,

    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
}

/// Partial update; every field is optional.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertForm {
    #[validate(length(min = 1, message = "workflowId must not be empty"))]
    pub workflow_id: Option<String>,

    #[validate(length(min = 1, message = "workflowName must not be empty"))]
    pub workflow_name: Option<String>,

    pub alert_type: Option<AlertType>,

    #[validate(range(min = 1, message = "threshold must be a positive integer"))]
    pub threshold: Option<i64>,

    pub enabled: Option<bool>,

    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: Option<String>,
}

/// A rule ready to be inserted: defaults filled, no id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkflowAlert {
    pub workflow_id: String,
    pub workflow_name: String,
    pub alert_type: AlertType,
    pub threshold: i64,
    pub enabled: bool,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<CreateAlertForm> for NewWorkflowAlert {
    fn from(form: CreateAlertForm) -> Self {
        NewWorkflowAlert {
            workflow_id: form.workflow_id,
            workflow_name: form.workflow_name,
            alert_type: form.alert_type,
            threshold: form.threshold.unwrap_or(DEFAULT_THRESHOLD),
            enabled: form.enabled.unwrap_or(DEFAULT_ENABLED),
            message: form.message,
            created_at: Utc::now(),
        }
    }
}

impl WorkflowAlert {
    /// Applies a partial update. `id` and `created_at` never change.
    pub fn merge(&mut self, patch: UpdateAlertForm) {
        if let Some(workflow_id) = patch.workflow_id {
            self.workflow_id = workflow_id;
        }
        if let Some(workflow_name) = patch.workflow_name {
            self.workflow_name = workflow_name;
        }
        if let Some(alert_type) = patch.alert_type {
            self.alert_type = alert_type;
        }
        if let Some(threshold) = patch.threshold {
            self.threshold = threshold;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
    }
}
