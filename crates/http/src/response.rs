//! Response shapes used by the workflow handlers: rendered pages, redirects
//! carrying a notification, and `{success}` acknowledgements.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::flash::{self, Flash, Notification};

/// Per-field validation failure reported alongside a re-rendered form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub error: String,
}

impl FieldError {
    pub fn new(field: &'static str, error: impl Into<String>) -> Self {
        Self {
            field,
            error: error.into(),
        }
    }
}

/// A rendered view: the view name plus the model it is rendered with.
///
/// Serialized as `{"view", "model", "notification"?, "errors"?}`.
#[derive(Debug)]
pub struct Page<T> {
    view: &'static str,
    model: T,
    notification: Option<Notification>,
    errors: Vec<FieldError>,
    clear_flash: bool,
}

impl<T: Serialize> Page<T> {
    pub fn new(view: &'static str, model: T) -> Self {
        Self {
            view,
            model,
            notification: None,
            errors: Vec::new(),
            clear_flash: false,
        }
    }

    /// Show the pending flash notification and clear its cookie
    pub fn consume(mut self, flash: Flash) -> Self {
        if let Some(pending) = flash.into_inner() {
            self.clear_flash = true;
            self.notification.get_or_insert(pending);
        }
        self
    }

    /// Attach a notification directly, for pages rendered without a redirect
    pub fn notify(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        let model = match serde_json::to_value(&self.model) {
            Ok(model) => model,
            Err(e) => return AppError::Internal(e.into()).into_response(),
        };

        let mut body = json!({
            "view": self.view,
            "model": model,
        });
        if let Some(notification) = &self.notification {
            body["notification"] = json!(notification);
        }
        if !self.errors.is_empty() {
            body["errors"] = json!(self.errors);
        }

        let mut response = (StatusCode::OK, Json(body)).into_response();
        if self.clear_flash {
            response
                .headers_mut()
                .append(header::SET_COOKIE, flash::clear_cookie());
        }
        response
    }
}

/// `303 See Other` to `location`, optionally leaving a notification for the next page
#[derive(Debug, Clone)]
pub struct Redirect {
    location: String,
    flash: Option<Notification>,
}

impl Redirect {
    pub fn to(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            flash: None,
        }
    }

    pub fn notify(mut self, notification: Notification) -> Self {
        self.flash = Some(notification);
        self
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

impl IntoResponse for Redirect {
    fn into_response(self) -> Response {
        let location = match HeaderValue::try_from(self.location.as_str()) {
            Ok(location) => location,
            Err(e) => return AppError::Internal(e.into()).into_response(),
        };

        let mut response = StatusCode::SEE_OTHER.into_response();
        response.headers_mut().insert(header::LOCATION, location);
        if let Some(cookie) = self.flash.as_ref().and_then(Notification::set_cookie) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
        response
    }
}

/// Acknowledgement for AJAX-style calls; failures are reported in the body, not the status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub success: bool,
}

impl Ack {
    pub fn new(success: bool) -> Self {
        Self { success }
    }

    pub fn failure() -> Self {
        Self::new(false)
    }
}

impl IntoResponse for Ack {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
