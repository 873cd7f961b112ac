//! Error envelope for requests that cannot be answered with a page, redirect
//! or acknowledgement.

use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

const INTERNAL_MESSAGE: &str = "An internal server error occurred";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {message}")]
    NotFound { message: String },

    /// No caller identity reached the handler
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// Caller is known but the route's policy refuses them
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// The request could not be decoded
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Infrastructure failure inside a service
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code carried in the envelope
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::BadRequest { .. } => "bad_request",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(self) -> String {
        match self {
            Self::NotFound { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::BadRequest { message } => message,
            // Release builds never leak infrastructure details
            Self::Internal(_) if cfg!(not(debug_assertions)) => INTERNAL_MESSAGE.to_string(),
            Self::Internal(e) => format!("{e:#}"),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let trace_id = Uuid::now_v7();
        let status = self.status();
        let code = self.code();

        if status.is_server_error() {
            tracing::error!(%trace_id, code, error = %format!("{self:#}"), "request failed");
        } else {
            tracing::debug!(%trace_id, code, status = status.as_u16(), "request rejected");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": self.client_message(),
                "details": [],
                "trace_id": trace_id.to_string(),
                "timestamp": OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            }
        });

        (status, Json(body)).into_response()
    }
}
