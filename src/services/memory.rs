//! In-memory directory, catalogs and ledger behind a single lock.
//!
//! The lock is a `parking_lot::RwLock` and is never held across an `.await`;
//! each service call is one critical section, so the ledger's
//! check-and-insert is atomic.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use anyhow::Context;
use async_trait::async_trait;
use kniga_authz::{Role, RoleSet};
use kniga_kernel::settings::SeedSettings;
use parking_lot::RwLock;

use super::models::{
    Book, BookId, NewBook, NewPublisher, NewPurchase, Purchase, PurchaseOutcome, PublisherId,
    Tag, TagId, User,
};
use super::{BooksService, PurchasesService, TagsService, UsersService};

#[derive(Debug, Clone)]
struct PublisherRecord {
    name: String,
}

#[derive(Debug, Clone)]
struct BookRecord {
    title: String,
    author: String,
    description: String,
    price_cents: u64,
    publisher_id: PublisherId,
    tags: BTreeSet<TagId>,
}

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    publishers: HashMap<PublisherId, PublisherRecord>,
    // UUIDv7 keys keep both maps in creation order
    books: BTreeMap<BookId, BookRecord>,
    tags: BTreeMap<TagId, String>,
    purchases: Vec<Purchase>,
    purchased: HashSet<(String, BookId)>,
}

impl State {
    fn book(&self, id: &BookId, record: &BookRecord) -> Book {
        let publisher_name = self
            .publishers
            .get(&record.publisher_id)
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let tags = record
            .tags
            .iter()
            .filter_map(|tag_id| {
                self.tags.get(tag_id).map(|name| Tag {
                    id: tag_id.clone(),
                    name: name.clone(),
                })
            })
            .collect();

        Book {
            id: id.clone(),
            title: record.title.clone(),
            author: record.author.clone(),
            description: record.description.clone(),
            price_cents: record.price_cents,
            publisher_id: record.publisher_id.clone(),
            publisher_name,
            tags,
        }
    }

    fn tag_by_name(&self, name: &str) -> Option<&TagId> {
        let name = name.to_lowercase();
        self.tags
            .iter()
            .find(|(_, existing)| existing.to_lowercase() == name)
            .map(|(id, _)| id)
    }

    fn insert_tag(&mut self, name: &str) -> Option<TagId> {
        let name = name.trim();
        if name.is_empty() || self.tag_by_name(name).is_some() {
            return None;
        }
        let id = TagId::generate();
        self.tags.insert(id.clone(), name.to_owned());
        Some(id)
    }

    fn insert_publisher(&mut self, publisher: NewPublisher) -> Option<PublisherId> {
        let user = self.users.get_mut(&publisher.user_name)?;
        if user.publisher_id.is_some() {
            return None;
        }

        let id = PublisherId::generate();
        user.publisher_id = Some(id.clone());
        user.roles.grant(Role::Publisher);
        self.publishers.insert(
            id.clone(),
            PublisherRecord {
                name: publisher.name,
            },
        );
        Some(id)
    }

    fn insert_book(&mut self, book: NewBook) -> Option<BookId> {
        if !self.publishers.contains_key(&book.publisher_id) {
            return None;
        }

        let id = BookId::generate();
        self.books.insert(
            id.clone(),
            BookRecord {
                title: book.title,
                author: book.author,
                description: book.description,
                price_cents: book.price_cents,
                publisher_id: book.publisher_id,
                tags: BTreeSet::new(),
            },
        );
        Some(id)
    }
}

pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// Build a store from the `[seed]` configuration section
    pub fn seeded(seed: &SeedSettings) -> anyhow::Result<Self> {
        let mut state = State::default();

        for user in &seed.users {
            let roles = RoleSet::parse(&user.roles)
                .with_context(|| format!("invalid roles for seeded user '{}'", user.name))?;
            let previous = state.users.insert(
                user.name.clone(),
                User {
                    name: user.name.clone(),
                    roles,
                    publisher_id: None,
                },
            );
            if previous.is_some() {
                anyhow::bail!("user '{}' is seeded twice", user.name);
            }

            if let Some(publisher) = &user.publisher {
                state
                    .insert_publisher(NewPublisher {
                        name: publisher.clone(),
                        user_name: user.name.clone(),
                    })
                    .with_context(|| format!("failed to seed publisher '{}'", publisher))?;
            }
        }

        for tag in &seed.tags {
            state
                .insert_tag(tag)
                .with_context(|| format!("tag '{}' is blank or seeded twice", tag))?;
        }

        for book in &seed.books {
            let publisher_id = state
                .users
                .get(&book.publisher_user)
                .and_then(|user| user.publisher_id.clone())
                .with_context(|| {
                    format!(
                        "book '{}' names '{}', who is not a seeded publisher",
                        book.title, book.publisher_user
                    )
                })?;
            let book_id = state
                .insert_book(NewBook {
                    title: book.title.clone(),
                    author: book.author.clone(),
                    description: book.description.clone(),
                    price_cents: book.price_cents,
                    publisher_id,
                })
                .with_context(|| format!("failed to seed book '{}'", book.title))?;

            for tag in &book.tags {
                let tag_id = state
                    .tag_by_name(tag)
                    .cloned()
                    .with_context(|| format!("book '{}' uses unknown tag '{}'", book.title, tag))?;
                if let Some(record) = state.books.get_mut(&book_id) {
                    record.tags.insert(tag_id);
                }
            }
        }

        tracing::info!(
            users = state.users.len(),
            publishers = state.publishers.len(),
            tags = state.tags.len(),
            books = state.books.len(),
            "in-memory store seeded"
        );

        Ok(Self {
            state: RwLock::new(state),
        })
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsersService for InMemoryStore {
    async fn find_user(&self, user_name: &str) -> anyhow::Result<Option<User>> {
        Ok(self.state.read().users.get(user_name).cloned())
    }

    async fn get_publisher_id_by_user_name(
        &self,
        user_name: &str,
    ) -> anyhow::Result<Option<PublisherId>> {
        Ok(self
            .state
            .read()
            .users
            .get(user_name)
            .and_then(|user| user.publisher_id.clone()))
    }

    async fn create_publisher(
        &self,
        publisher: NewPublisher,
    ) -> anyhow::Result<Option<PublisherId>> {
        Ok(self.state.write().insert_publisher(publisher))
    }
}

#[async_trait]
impl TagsService for InMemoryStore {
    async fn list_tags(&self) -> anyhow::Result<Vec<Tag>> {
        let state = self.state.read();
        let mut tags: Vec<Tag> = state
            .tags
            .iter()
            .map(|(id, name)| Tag {
                id: id.clone(),
                name: name.clone(),
            })
            .collect();
        tags.sort_by_key(|tag| tag.name.to_lowercase());
        Ok(tags)
    }

    async fn create_tag(&self, name: &str) -> anyhow::Result<Option<TagId>> {
        Ok(self.state.write().insert_tag(name))
    }
}

#[async_trait]
impl BooksService for InMemoryStore {
    async fn create_book(&self, book: NewBook) -> anyhow::Result<Option<BookId>> {
        Ok(self.state.write().insert_book(book))
    }

    async fn find_book(&self, id: &BookId) -> anyhow::Result<Option<Book>> {
        let state = self.state.read();
        Ok(state.books.get(id).map(|record| state.book(id, record)))
    }

    async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        let state = self.state.read();
        Ok(state
            .books
            .iter()
            .map(|(id, record)| state.book(id, record))
            .collect())
    }

    async fn add_tag_to_book(&self, book_id: &BookId, tag_id: &TagId) -> anyhow::Result<bool> {
        let mut state = self.state.write();
        if !state.tags.contains_key(tag_id) {
            return Ok(false);
        }
        Ok(match state.books.get_mut(book_id) {
            Some(record) => record.tags.insert(tag_id.clone()),
            None => false,
        })
    }

    async fn remove_tag_from_book(&self, book_id: &BookId, tag_id: &TagId) -> anyhow::Result<()> {
        if let Some(record) = self.state.write().books.get_mut(book_id) {
            record.tags.remove(tag_id);
        }
        Ok(())
    }
}

#[async_trait]
impl PurchasesService for InMemoryStore {
    async fn has_purchased(&self, book_id: &BookId, user_name: &str) -> anyhow::Result<bool> {
        Ok(self
            .state
            .read()
            .purchased
            .contains(&(user_name.to_owned(), book_id.clone())))
    }

    async fn create(&self, purchase: NewPurchase) -> anyhow::Result<PurchaseOutcome> {
        let mut state = self.state.write();

        let Some(book_title) = state.books.get(&purchase.book_id).map(|b| b.title.clone()) else {
            return Ok(PurchaseOutcome::Rejected);
        };
        if !state
            .purchased
            .insert((purchase.user_name.clone(), purchase.book_id.clone()))
        {
            return Ok(PurchaseOutcome::AlreadyPurchased);
        }

        state.purchases.push(Purchase {
            book_id: purchase.book_id,
            book_title,
            user_name: purchase.user_name,
            purchased_on: purchase.purchased_on,
        });
        Ok(PurchaseOutcome::Recorded)
    }

    async fn purchases_for_user(&self, user_name: &str) -> anyhow::Result<Vec<Purchase>> {
        Ok(self
            .state
            .read()
            .purchases
            .iter()
            .filter(|purchase| purchase.user_name == user_name)
            .cloned()
            .collect())
    }
}
