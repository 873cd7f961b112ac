mod common;

use axum::http::{header, StatusCode};
use std::sync::Arc;

use common::{RefusingCatalog, TestApp, ADMIN, CIELA, ORBIT, READER, SEEDED_TITLE};
use kniga_app::utils::{self, messages};
use serde_json::Value;

const VALID_BOOK: &str = "title=Tobacco&author=Dimitar+Dimov&description=&price=15.50";

fn tag_names(details: &Value) -> Vec<String> {
    details["model"]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn publishing_routes_require_a_publishing_role() {
    let app = TestApp::new();

    let anonymous = app.get("/api/books/create", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.json()["error"]["code"], "unauthorized");

    let reader = app.get("/api/books/create", Some(READER)).await;
    assert_eq!(reader.status, StatusCode::FORBIDDEN);

    let reader_post = app
        .post_form("/api/books/create", Some(READER), VALID_BOOK)
        .await;
    assert_eq!(reader_post.status, StatusCode::FORBIDDEN);

    let add_tag = app
        .post_form("/api/books/add-tag", None, "bookId=x&tagId=y")
        .await;
    assert_eq!(add_tag.status, StatusCode::UNAUTHORIZED);

    let publisher = app.get("/api/books/create", Some(CIELA)).await;
    assert_eq!(publisher.status, StatusCode::OK);
    assert_eq!(publisher.json()["view"], "books/create");
}

#[tokio::test]
async fn invalid_book_rerenders_the_form_without_writing() {
    let app = TestApp::new();

    let response = app
        .post_form(
            "/api/books/create",
            Some(CIELA),
            "title=&author=Dimitar+Dimov&price=free",
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let page = response.json();
    assert_eq!(page["view"], "books/create");
    assert_eq!(page["model"]["author"], "Dimitar Dimov");
    assert_eq!(page["notification"]["kind"], "error");
    assert_eq!(page["notification"]["message"], messages::BOOK_CREATE_ERROR);
    let fields: Vec<_> = page["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["title", "price"]);

    assert_eq!(app.services.books.list_books().await.unwrap().len(), 1);
}

#[tokio::test]
async fn refused_book_rerenders_the_form() {
    let app = TestApp::with_services(|mut services| {
        services.books = Arc::new(RefusingCatalog(services.books));
        services
    });

    let response = app
        .post_form("/api/books/create", Some(CIELA), VALID_BOOK)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.flash_cookie().is_none());
    let page = response.json();
    assert_eq!(page["view"], "books/create");
    assert_eq!(page["model"]["title"], "Tobacco");
    assert_eq!(page["notification"]["kind"], "error");
    assert_eq!(page["notification"]["message"], messages::BOOK_CREATE_ERROR);
    assert_eq!(app.services.books.list_books().await.unwrap().len(), 1);
}

#[tokio::test]
async fn administrator_without_publisher_is_sent_home_with_an_error() {
    let app = TestApp::new();

    let response = app
        .post_form("/api/books/create", Some(ADMIN), VALID_BOOK)
        .await;
    response.assert_redirect(utils::HOME);
    let cookie = response.flash_cookie().unwrap();

    let home = app.get_with_cookie("/", Some(ADMIN), &cookie).await;
    assert_eq!(home.status, StatusCode::OK);
    let page = home.json();
    assert_eq!(page["view"], "home/index");
    assert_eq!(page["notification"]["message"], messages::BOOK_CREATE_ERROR);

    assert_eq!(app.services.books.list_books().await.unwrap().len(), 1);
}

#[tokio::test]
async fn created_book_opens_with_a_single_read_notification() {
    let app = TestApp::new();

    let response = app
        .post_form("/api/books/create", Some(CIELA), VALID_BOOK)
        .await;
    assert_eq!(response.status, StatusCode::SEE_OTHER);
    let book_id = app.book_id("Tobacco").await;
    assert_eq!(response.location(), utils::book_details(&book_id));
    let cookie = response.flash_cookie().unwrap();

    let details = app
        .get_with_cookie(response.location(), Some(CIELA), &cookie)
        .await;
    assert_eq!(details.status, StatusCode::OK);
    let cleared = details.headers[header::SET_COOKIE].to_str().unwrap();
    assert!(cleared.starts_with("kniga_flash=;"));
    assert!(cleared.contains("Max-Age=0"));

    let page = details.json();
    assert_eq!(page["view"], "books/details");
    assert_eq!(page["notification"]["kind"], "success");
    assert_eq!(page["notification"]["message"], messages::BOOK_CREATE_SUCCESS);
    assert_eq!(page["model"]["title"], "Tobacco");
    assert_eq!(page["model"]["price_cents"], 1550);
    assert_eq!(page["model"]["publisher_name"], "Ciela");
    assert_eq!(page["model"]["can_edit"], true);
    assert_eq!(page["model"]["all_tags"].as_array().unwrap().len(), 2);

    let again = app.get(response.location(), Some(CIELA)).await;
    assert!(again.json().get("notification").is_none());
    assert!(again.headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn only_owner_and_administrator_may_edit_a_book() {
    let app = TestApp::new();
    let path = utils::book_details(&app.book_id(SEEDED_TITLE).await);

    for (user, can_edit) in [
        (None, false),
        (Some(READER), false),
        (Some(ORBIT), false),
        (Some(CIELA), true),
        (Some(ADMIN), true),
        (Some("stranger"), false),
    ] {
        let page = app.get(&path, user).await.json();
        assert_eq!(page["model"]["can_edit"], can_edit, "caller {user:?}");
        assert_eq!(
            page["model"].get("all_tags").is_some(),
            can_edit,
            "caller {user:?}"
        );
        assert_eq!(tag_names(&page), ["Classics"]);
    }
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/api/books/no-such-book", Some(CIELA)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"]["code"], "not_found");
}

#[tokio::test]
async fn non_owner_cannot_tag_a_book() {
    let app = TestApp::new();
    let book_id = app.book_id(SEEDED_TITLE).await;
    let poetry = app.tag_id("Poetry").await;
    let form = format!("bookId={book_id}&tagId={poetry}");

    let refused = app
        .post_form("/api/books/add-tag", Some(ORBIT), &form)
        .await;
    assert_eq!(refused.status, StatusCode::OK);
    assert_eq!(refused.json(), serde_json::json!({"success": false}));

    let details = app
        .get(&utils::book_details(&book_id), Some(CIELA))
        .await
        .json();
    assert_eq!(tag_names(&details), ["Classics"]);

    let added = app
        .post_form("/api/books/add-tag", Some(ADMIN), &form)
        .await;
    assert_eq!(added.json()["success"], true);

    let duplicate = app
        .post_form("/api/books/add-tag", Some(CIELA), &form)
        .await;
    assert_eq!(duplicate.json()["success"], false);

    let details = app
        .get(&utils::book_details(&book_id), None)
        .await
        .json();
    assert_eq!(tag_names(&details), ["Classics", "Poetry"]);
}

#[tokio::test]
async fn missing_ids_are_acknowledged_as_failures() {
    let app = TestApp::new();
    let book_id = app.book_id(SEEDED_TITLE).await;

    for form in [
        String::new(),
        format!("bookId={book_id}"),
        format!("bookId={book_id}&tagId=+"),
    ] {
        let response = app
            .post_form("/api/books/add-tag", Some(CIELA), &form)
            .await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json()["success"], false, "form {form:?}");
    }

    let unknown_book = app
        .post_form("/api/books/remove-tag", Some(ADMIN), "bookId=nope&tagId=t")
        .await;
    assert_eq!(unknown_book.json()["success"], false);
}

#[tokio::test]
async fn bodiless_tag_change_is_acknowledged_as_a_failure() {
    let app = TestApp::new();
    let book_id = app.book_id(SEEDED_TITLE).await;
    let tag_id = app.tag_id("Poetry").await;

    for path in [
        "/api/books/add-tag".to_string(),
        format!("/api/books/add-tag?bookId={book_id}&tagId={tag_id}"),
        "/api/books/remove-tag".to_string(),
    ] {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri(&path)
            .header("x-forwarded-user", CIELA)
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app.send(request).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert_eq!(response.json()["success"], false, "{path}");
    }

    let details = app
        .get(&utils::book_details(&book_id), Some(CIELA))
        .await
        .json();
    assert_eq!(tag_names(&details), ["Classics"]);
}

#[tokio::test]
async fn remove_tag_succeeds_whenever_the_caller_may_edit() {
    let app = TestApp::new();
    let book_id = app.book_id(SEEDED_TITLE).await;
    let classics = app.tag_id("Classics").await;
    let poetry = app.tag_id("Poetry").await;

    let never_attached = app
        .post_form(
            "/api/books/remove-tag",
            Some(CIELA),
            &format!("bookId={book_id}&tagId={poetry}"),
        )
        .await;
    assert_eq!(never_attached.json()["success"], true);

    let not_owner = app
        .post_form(
            "/api/books/remove-tag",
            Some(ORBIT),
            &format!("bookId={book_id}&tagId={classics}"),
        )
        .await;
    assert_eq!(not_owner.json()["success"], false);

    let removed = app
        .post_form(
            "/api/books/remove-tag",
            Some(CIELA),
            &format!("bookId={book_id}&tagId={classics}"),
        )
        .await;
    assert_eq!(removed.json()["success"], true);

    let details = app
        .get(&utils::book_details(&book_id), None)
        .await
        .json();
    assert!(tag_names(&details).is_empty());
}

#[tokio::test]
async fn listing_is_public() {
    let app = TestApp::new();

    let page = app.get("/api/books", None).await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.json()["view"], "books/index");

    let all = app.get("/api/books/all", None).await.json();
    let rows = all.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["title"], SEEDED_TITLE);
    assert_eq!(rows[0]["publisher_name"], "Ciela");
    assert_eq!(rows[0]["price_cents"], 1899);
}
