use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use validator::ValidationErrors;

use crate::services::proxy::ProxyError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    InvalidInput {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No n8n configuration found")]
    ConfigurationMissing,

    #[error("Invalid stored body: {0}")]
    InvalidBody(String),

    #[error("{context}")]
    Upstream {
        context: String,
        status: Option<u16>,
        detail: Value,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// One entry of the machine-readable error list returned with a 400.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, code: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl AppError {
    pub fn invalid_field(field: &str, code: &str, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            message: "Invalid data format".to_string(),
            errors: vec![FieldError::new(field, code, message)],
        }
    }

    pub fn upstream(context: impl Into<String>, err: ProxyError) -> Self {
        let (status, detail) = match err {
            ProxyError::Status { status, body } => (Some(status), body),
            ProxyError::Transport(message) => (None, Value::String(message)),
        };
        AppError::Upstream {
            context: context.into(),
            status,
            detail,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut field_errors: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = camel_case(&field);
                errs.iter().map(move |e| FieldError {
                    field: field.clone(),
                    code: e.code.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        field_errors.sort_by(|a, b| a.field.cmp(&b.field));

        AppError::InvalidInput {
            message: "Invalid data format".to_string(),
            errors: field_errors,
        }
    }
}

/// Validator reports Rust field names; the API speaks camelCase.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfigurationMissing => StatusCode::NOT_FOUND,
            AppError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| !s.is_success())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::InvalidInput { message, errors } => ErrorResponse {
                message: message.clone(),
                errors: Some(errors.clone()),
                error: None,
            },
            AppError::NotFound(ref e) => ErrorResponse {
                message: e.clone(),
                errors: None,
                error: None,
            },
            AppError::Upstream {
                context, detail, ..
            } => ErrorResponse {
                message: context.clone(),
                errors: None,
                error: Some(detail.clone()),
            },
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ErrorResponse {
                    message: "Storage failure".to_string(),
                    errors: None,
                    error: None,
                }
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                ErrorResponse {
                    message: e.clone(),
                    errors: None,
                    error: None,
                }
            }
            other => ErrorResponse {
                message: other.to_string(),
                errors: None,
                error: None,
            },
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

pub type AppResult<T> = Result<T, AppError>;
