//! Single-read notifications carried across a redirect in a cookie.
//!
//! A handler attaches a [`Notification`] to a [`crate::response::Redirect`];
//! the browser sends it back on the next request, where the [`Flash`]
//! extractor picks it up and the rendered [`crate::response::Page`] clears it.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderValue},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "kniga_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// User-facing message shown once by the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    /// Cookie-safe encoding: base64url over the JSON form
    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(value: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(value.trim()).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    pub(crate) fn set_cookie(&self) -> Option<HeaderValue> {
        HeaderValue::try_from(format!(
            "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            self.encode()
        ))
        .ok()
    }
}

pub(crate) fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("kniga_flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Notification pending for this request, if the client sent one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash(pub Option<Notification>);

impl Flash {
    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    pub fn into_inner(self) -> Option<Notification> {
        self.0
    }

    fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let notification = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookies| cookies.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .and_then(|(_, value)| Notification::decode(value));
        Self(notification)
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
