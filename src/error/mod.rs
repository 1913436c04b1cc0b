use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::records::RecordError;
use crate::retention::RetentionError;
use crate::template::TemplateError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Retention(#[from] RetentionError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

/// Check if running in production mode (based on RUN_MODE env var)
fn is_production() -> bool {
    std::env::var("RUN_MODE")
        .map(|m| m == "production" || m == "prod")
        .unwrap_or(false)
}

fn template_status(err: &TemplateError) -> (StatusCode, &'static str) {
    match err {
        TemplateError::UnknownChannel(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_CHANNEL"),
        TemplateError::UnknownMessageType(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_MESSAGE_TYPE"),
        TemplateError::EmptyTemplate { .. } => (StatusCode::BAD_REQUEST, "EMPTY_TEMPLATE"),
        TemplateError::Load(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_LOAD_FAILED"),
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Template(e) => template_status(e),
            AppError::Record(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RECORD"),
            AppError::Retention(e) => match e {
                RetentionError::MissingContact { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "MISSING_CONTACT")
                }
                RetentionError::AutomationDisabled(_) => {
                    (StatusCode::CONFLICT, "AUTOMATION_DISABLED")
                }
                RetentionError::InvalidSettings(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_SETTINGS")
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let log_message = self.to_string();

        let client_message = if status.is_server_error() && is_production() {
            "Internal server error".to_string()
        } else {
            log_message.clone()
        };

        // Always log the detailed error server-side
        tracing::error!(
            code = %code,
            status = %status.as_u16(),
            message = %log_message,
            "API error"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: client_message,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{Channel, MessageType};

    #[test]
    fn test_status_mapping() {
        let err = AppError::from(TemplateError::UnknownChannel("fax".to_string()));
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "UNKNOWN_CHANNEL"));

        let err = AppError::from(RetentionError::MissingContact {
            channel: Channel::Email,
            recipient: "Ana".to_string(),
        });
        assert_eq!(err.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);

        let err = AppError::from(RetentionError::AutomationDisabled(MessageType::Reminder));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_template_load_failure_is_a_server_error() {
        let err = AppError::from(TemplateError::Load("bad seed".to_string()));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_LOAD_FAILED")
        );
    }
}
