#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use std::sync::Arc;

use async_trait::async_trait;
use kniga_app::services::{
    Book, BookId, BooksService, NewBook, NewPurchase, Purchase, PurchaseOutcome,
    PurchasesService, Services, TagId,
};
use kniga_kernel::settings::{BookSeed, SeedSettings, Settings, UserSeed};
use tower::ServiceExt;

pub const ADMIN: &str = "admin";
pub const CIELA: &str = "ciela";
pub const ORBIT: &str = "orbit";
pub const READER: &str = "reader";
pub const SEEDED_TITLE: &str = "Under the Yoke";

fn user(name: &str, roles: &[&str], publisher: Option<&str>) -> UserSeed {
    UserSeed {
        name: name.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        publisher: publisher.map(str::to_string),
    }
}

/// Administrator without a publisher, two publishers and a plain reader;
/// one book owned by `ciela` and tagged "Classics"
pub fn seed() -> SeedSettings {
    SeedSettings {
        users: vec![
            user(ADMIN, &["Administrator"], None),
            user(CIELA, &[], Some("Ciela")),
            user(ORBIT, &[], Some("Orbit")),
            user(READER, &[], None),
        ],
        tags: vec!["Classics".to_string(), "Poetry".to_string()],
        books: vec![BookSeed {
            title: SEEDED_TITLE.to_string(),
            author: "Ivan Vazov".to_string(),
            description: "A novel of the April Uprising.".to_string(),
            price_cents: 1899,
            publisher_user: CIELA.to_string(),
            tags: vec!["Classics".to_string()],
        }],
    }
}

pub struct TestApp {
    router: Router,
    pub services: Services,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_services(|services| services)
    }

    /// Seeded app whose services are first passed through `customize`
    pub fn with_services(customize: impl FnOnce(Services) -> Services) -> Self {
        let settings = Settings {
            seed: seed(),
            ..Settings::default()
        };
        let services = customize(Services::in_memory(&settings.seed).unwrap());
        let registry = kniga_app::registry(&services).unwrap();
        let router = kniga_app::router(&settings, &registry, &services).unwrap();
        Self { router, services }
    }

    pub async fn book_id(&self, title: &str) -> BookId {
        self.services
            .books
            .list_books()
            .await
            .unwrap()
            .into_iter()
            .find(|book| book.title == title)
            .map(|book| book.id)
            .unwrap()
    }

    pub async fn tag_id(&self, name: &str) -> String {
        self.services
            .tags
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .find(|tag| tag.name == name)
            .map(|tag| tag.id.to_string())
            .unwrap()
    }

    pub async fn get(&self, path: &str, user: Option<&str>) -> TestResponse {
        self.send(request("GET", path, user).body(Body::empty()).unwrap())
            .await
    }

    pub async fn get_with_cookie(
        &self,
        path: &str,
        user: Option<&str>,
        cookie: &str,
    ) -> TestResponse {
        self.send(
            request("GET", path, user)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, path: &str, user: Option<&str>, form: &str) -> TestResponse {
        self.send(
            request("POST", path, user)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body,
        }
    }
}

fn request(method: &str, path: &str, user: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(path);
    match user {
        Some(name) => builder.header("x-forwarded-user", name),
        None => builder,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn location(&self) -> &str {
        self.headers[header::LOCATION].to_str().unwrap()
    }

    /// `name=value` of the flash cookie set by this response, if any
    pub fn flash_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with("kniga_flash="))
            .and_then(|value| value.split(';').next())
            .map(str::to_string)
    }

    pub fn assert_redirect(&self, location: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER);
        assert_eq!(self.location(), location);
    }
}

/// Catalog that reads from the seeded store but refuses every new book
pub struct RefusingCatalog(pub Arc<dyn BooksService>);

#[async_trait]
impl BooksService for RefusingCatalog {
    async fn create_book(&self, _book: NewBook) -> anyhow::Result<Option<BookId>> {
        Ok(None)
    }

    async fn find_book(&self, id: &BookId) -> anyhow::Result<Option<Book>> {
        self.0.find_book(id).await
    }

    async fn list_books(&self) -> anyhow::Result<Vec<Book>> {
        self.0.list_books().await
    }

    async fn add_tag_to_book(&self, book_id: &BookId, tag_id: &TagId) -> anyhow::Result<bool> {
        self.0.add_tag_to_book(book_id, tag_id).await
    }

    async fn remove_tag_from_book(&self, book_id: &BookId, tag_id: &TagId) -> anyhow::Result<()> {
        self.0.remove_tag_from_book(book_id, tag_id).await
    }
}

/// Ledger where another request always records the purchase between the
/// `has_purchased` check and `create`
pub struct RacedLedger;

#[async_trait]
impl PurchasesService for RacedLedger {
    async fn has_purchased(&self, _book_id: &BookId, _user_name: &str) -> anyhow::Result<bool> {
        Ok(false)
    }

    async fn create(&self, _purchase: NewPurchase) -> anyhow::Result<PurchaseOutcome> {
        Ok(PurchaseOutcome::AlreadyPurchased)
    }

    async fn purchases_for_user(&self, _user_name: &str) -> anyhow::Result<Vec<Purchase>> {
        Ok(Vec::new())
    }
}
