use kniga_http::response::FieldError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::tags::models::TagDisplay;
use crate::services::{Book, BookId, NewBook, PublisherId, TagId};
use crate::utils::char_len;

const TITLE_MAX: usize = 100;
const AUTHOR_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 2000;
const PRICE_MAX_CENTS: u64 = 100_000_000;

/// Book creation form as submitted; echoed back when it has to be re-rendered
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BookCreateForm {
    pub title: String,
    pub author: String,
    pub description: String,
    /// Decimal amount such as `12.99`
    pub price: String,
}

/// A creation form that passed validation, still missing its owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price_cents: u64,
}

impl BookInput {
    pub fn published_by(self, publisher_id: PublisherId) -> NewBook {
        NewBook {
            title: self.title,
            author: self.author,
            description: self.description,
            price_cents: self.price_cents,
            publisher_id,
        }
    }
}

impl BookCreateForm {
    pub fn validate(&self) -> Result<BookInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError::new("title", "required"));
        } else if char_len(title) > TITLE_MAX {
            errors.push(FieldError::new("title", format!("at most {TITLE_MAX} characters")));
        }

        let author = self.author.trim();
        if author.is_empty() {
            errors.push(FieldError::new("author", "required"));
        } else if char_len(author) > AUTHOR_MAX {
            errors.push(FieldError::new("author", format!("at most {AUTHOR_MAX} characters")));
        }

        let description = self.description.trim();
        if char_len(description) > DESCRIPTION_MAX {
            errors.push(FieldError::new(
                "description",
                format!("at most {DESCRIPTION_MAX} characters"),
            ));
        }

        let price_cents = match parse_price_cents(&self.price) {
            Some(cents) if cents <= PRICE_MAX_CENTS => Some(cents),
            Some(_) => {
                errors.push(FieldError::new("price", "at most 1000000.00"));
                None
            }
            None => {
                errors.push(FieldError::new(
                    "price",
                    "a non-negative amount with at most two decimals",
                ));
                None
            }
        };

        match price_cents {
            Some(price_cents) if errors.is_empty() => Ok(BookInput {
                title: title.to_owned(),
                author: author.to_owned(),
                description: description.to_owned(),
                price_cents,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_price_cents(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if whole.is_empty() || !digits(whole) || fraction.len() > 2 || !digits(fraction) {
        return None;
    }

    let whole: u64 = whole.parse().ok()?;
    let fraction: u64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<u64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(fraction)
}

/// Row of the public book listing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookListing {
    #[schema(value_type = String)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publisher_name: String,
    pub price_cents: u64,
}

impl From<Book> for BookListing {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            publisher_name: book.publisher_name,
            price_cents: book.price_cents,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[schema(value_type = String)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price_cents: u64,
    #[schema(value_type = String)]
    pub publisher_id: PublisherId,
    pub publisher_name: String,
    pub tags: Vec<TagDisplay>,
}

impl From<Book> for BookDetails {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            price_cents: book.price_cents,
            publisher_id: book.publisher_id,
            publisher_name: book.publisher_name,
            tags: book.tags.into_iter().map(TagDisplay::from).collect(),
        }
    }
}

/// Details page model; `all_tags` is only filled in for callers who may edit
#[derive(Debug, Clone, Serialize)]
pub struct BookDetailsView {
    #[serde(flatten)]
    pub book: BookDetails,
    pub can_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_tags: Option<Vec<TagDisplay>>,
}

/// Body of the AJAX tag association calls
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct TagAssignmentForm {
    pub book_id: Option<String>,
    pub tag_id: Option<String>,
}

impl TagAssignmentForm {
    /// Both ids, or `None` if either is missing or blank
    pub fn ids(&self) -> Option<(BookId, TagId)> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Some((
            BookId::from(present(&self.book_id)?),
            TagId::from(present(&self.tag_id)?),
        ))
    }
}
