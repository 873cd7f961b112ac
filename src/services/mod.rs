//! Collaborators the workflow modules call into.
//!
//! Every method returns `anyhow::Result` for infrastructure failure; domain
//! outcomes travel inside the `Ok` value as sentinels (`None`, `false`,
//! [`PurchaseOutcome::Rejected`]) and are turned into user-facing results by
//! the handlers.

pub mod memory;
pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use kniga_authz::{RoleResolver, RoleSet};
use kniga_kernel::settings::SeedSettings;

pub use models::{
    Book, BookId, NewBook, NewPublisher, NewPurchase, Purchase, PurchaseOutcome, PublisherId,
    Tag, TagId, User,
};

#[async_trait]
pub trait UsersService: Send + Sync {
    async fn find_user(&self, user_name: &str) -> anyhow::Result<Option<User>>;

    async fn get_publisher_id_by_user_name(
        &self,
        user_name: &str,
    ) -> anyhow::Result<Option<PublisherId>>;

    /// Link a new publisher to an existing user; `None` if the user is unknown
    /// or already has a publisher
    async fn create_publisher(&self, publisher: NewPublisher)
        -> anyhow::Result<Option<PublisherId>>;
}

#[async_trait]
pub trait TagsService: Send + Sync {
    async fn list_tags(&self) -> anyhow::Result<Vec<Tag>>;

    /// `None` if a tag with the same name already exists
    async fn create_tag(&self, name: &str) -> anyhow::Result<Option<TagId>>;
}

#[async_trait]
pub trait BooksService: Send + Sync {
    /// `None` if the catalog refused the book
    async fn create_book(&self, book: NewBook) -> anyhow::Result<Option<BookId>>;

    async fn find_book(&self, id: &BookId) -> anyhow::Result<Option<Book>>;

    async fn list_books(&self) -> anyhow::Result<Vec<Book>>;

    /// `false` if the book or tag is unknown or the tag is already attached
    async fn add_tag_to_book(&self, book_id: &BookId, tag_id: &TagId) -> anyhow::Result<bool>;

    async fn remove_tag_from_book(&self, book_id: &BookId, tag_id: &TagId)
        -> anyhow::Result<()>;
}

impl dyn BooksService {
    /// Fetch a book projected into the read shape `S`
    pub async fn get_book_by_id<S: From<Book>>(&self, id: &BookId) -> anyhow::Result<Option<S>> {
        Ok(self.find_book(id).await?.map(S::from))
    }

    pub async fn get_all_books<S: From<Book>>(&self) -> anyhow::Result<Vec<S>> {
        Ok(self.list_books().await?.into_iter().map(S::from).collect())
    }
}

#[async_trait]
pub trait PurchasesService: Send + Sync {
    async fn has_purchased(&self, book_id: &BookId, user_name: &str) -> anyhow::Result<bool>;

    /// Records at most one purchase per (user, book), atomically
    async fn create(&self, purchase: NewPurchase) -> anyhow::Result<PurchaseOutcome>;

    async fn purchases_for_user(&self, user_name: &str) -> anyhow::Result<Vec<Purchase>>;
}

/// Handles to every collaborator, cloned into each module's router state
#[derive(Clone)]
pub struct Services {
    pub users: Arc<dyn UsersService>,
    pub tags: Arc<dyn TagsService>,
    pub books: Arc<dyn BooksService>,
    pub purchases: Arc<dyn PurchasesService>,
}

impl Services {
    /// All four services backed by one seeded [`memory::InMemoryStore`]
    pub fn in_memory(seed: &SeedSettings) -> anyhow::Result<Self> {
        let store = Arc::new(memory::InMemoryStore::seeded(seed)?);
        Ok(Self {
            users: store.clone(),
            tags: store.clone(),
            books: store.clone(),
            purchases: store,
        })
    }
}

/// Adapts the user directory to the identity middleware
pub struct DirectoryRoles(pub Arc<dyn UsersService>);

#[async_trait]
impl RoleResolver for DirectoryRoles {
    async fn roles_for(&self, user_name: &str) -> anyhow::Result<RoleSet> {
        Ok(self
            .0
            .find_user(user_name)
            .await?
            .map(|user| user.roles)
            .unwrap_or_default())
    }
}
