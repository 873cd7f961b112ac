//! Helpers shared by the workflow modules.

pub mod messages;

use utoipa::ToSchema;

use crate::services::BookId;

/// Redirect target for every "go home" outcome
pub const HOME: &str = "/";

/// Location of a book's details page
pub fn book_details(id: &BookId) -> String {
    format!("/api/books/{id}")
}

/// Length in characters, as users count them
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// JSON form of `T`'s derived OpenAPI schema, for module documentation fragments
pub fn openapi_schema<T: ToSchema>() -> serde_json::Value {
    serde_json::to_value(T::schema()).unwrap_or_default()
}
