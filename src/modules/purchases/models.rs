use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::services::{Book, BookId, Purchase};

/// `bookId` as sent by the confirmation link and the buy form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub book_id: Option<String>,
}

impl PurchaseRequest {
    pub fn book_id(&self) -> Option<BookId> {
        self.book_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(BookId::from)
    }
}

/// What the buyer is shown before committing
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookConfirmPurchase {
    #[schema(value_type = String)]
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publisher_name: String,
    pub price_cents: u64,
}

impl From<Book> for BookConfirmPurchase {
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
pub struct PurchaseListing {
    #[schema(value_type = String)]
    pub book_id: BookId,
    pub book_title: String,
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub purchased_on: OffsetDateTime,
}

impl From<Purchase> for PurchaseListing {
    fn from(purchase: Purchase) -> Self {
        Self {
            book_id: purchase.book_id,
            book_title: purchase.book_title,
            purchased_on: purchase.purchased_on,
        }
    }
}
