//! Service-level records exchanged between the workflow modules and the
//! directory, catalogs and ledger.

use std::fmt;

use kniga_authz::RoleSet;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Fresh time-ordered id
            pub fn generate() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identity of a book in the catalog
    BookId
);
string_id!(TagId);
string_id!(
    /// Identity linking a publisher account to the books it owns
    PublisherId
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub description: String,
    pub price_cents: u64,
    pub publisher_id: PublisherId,
    pub publisher_name: String,
    pub tags: Vec<Tag>,
}

/// Input for `BooksService::create_book`; the owner is fixed here for good
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub price_cents: u64,
    pub publisher_id: PublisherId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub roles: RoleSet,
    pub publisher_id: Option<PublisherId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPublisher {
    pub name: String,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchase {
    pub book_id: BookId,
    pub user_name: String,
    pub purchased_on: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub book_id: BookId,
    pub book_title: String,
    pub user_name: String,
    pub purchased_on: OffsetDateTime,
}

/// Result of handing a purchase to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Recorded,
    /// The (user, book) pair was already in the ledger; nothing was written
    AlreadyPurchased,
    /// The ledger refused the purchase, e.g. the book does not exist
    Rejected,
}
