use axum::{
    extract::{rejection::FormRejection, Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use kniga_authz::{enforce, Policy, Principal};
use kniga_http::{
    error::AppError,
    flash::{Flash, Notification},
    response::{Ack, Page, Redirect},
};

use super::models::{
    BookCreateForm, BookDetails, BookDetailsView, BookListing, TagAssignmentForm,
};
use super::policy::can_edit_book;
use crate::modules::tags::models::TagDisplay;
use crate::services::{BookId, Services, TagId};
use crate::utils::{self, messages};

const VIEW_CREATE: &str = "books/create";
const VIEW_INDEX: &str = "books/index";
const VIEW_DETAILS: &str = "books/details";

/// Routes of the books module, relative to `/api/books`
pub fn router(services: Services) -> Router {
    let publishing = Router::new()
        .route("/create", get(create_form).post(create))
        .route("/add-tag", post(add_tag_to_book))
        .route("/remove-tag", post(remove_tag_from_book))
        .route_layer(middleware::from_fn_with_state(
            Policy::AdministratorOrPublisher,
            enforce,
        ));

    Router::new()
        .route("/", get(index))
        .route("/all", get(get_books))
        .route("/{id}", get(details))
        .merge(publishing)
        .with_state(services)
}

async fn create_form(flash: Flash) -> Page<BookCreateForm> {
    Page::new(VIEW_CREATE, BookCreateForm::default()).consume(flash)
}

fn create_failed(form: BookCreateForm) -> Page<BookCreateForm> {
    Page::new(VIEW_CREATE, form).notify(Notification::error(messages::BOOK_CREATE_ERROR))
}

async fn create(
    State(services): State<Services>,
    principal: Principal,
    form: Result<Form<BookCreateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let input = match form.validate() {
        Ok(input) => input,
        Err(errors) => {
            tracing::debug!(errors = errors.len(), "book creation form rejected");
            return Ok(create_failed(form).with_errors(errors).into_response());
        }
    };

    let user_name = principal
        .name()
        .ok_or_else(|| AppError::unauthorized("authentication required"))?;

    let Some(publisher_id) = services
        .users
        .get_publisher_id_by_user_name(user_name)
        .await?
    else {
        tracing::warn!(user = user_name, "book creation by a user without a publisher");
        return Ok(Redirect::to(utils::HOME)
            .notify(Notification::error(messages::BOOK_CREATE_ERROR))
            .into_response());
    };

    let Some(book_id) = services
        .books
        .create_book(input.published_by(publisher_id.clone()))
        .await?
    else {
        tracing::warn!(user = user_name, publisher = %publisher_id, "catalog refused new book");
        return Ok(create_failed(form).into_response());
    };

    tracing::info!(user = user_name, book = %book_id, "book created");
    Ok(Redirect::to(utils::book_details(&book_id))
        .notify(Notification::success(messages::BOOK_CREATE_SUCCESS))
        .into_response())
}

/// The listing page itself loads its rows from `/api/books/all`
async fn index(flash: Flash) -> Page<()> {
    Page::new(VIEW_INDEX, ()).consume(flash)
}

async fn get_books(State(services): State<Services>) -> Result<Json<Vec<BookListing>>, AppError> {
    let books = services.books.get_all_books::<BookListing>().await?;
    Ok(Json(books))
}

async fn details(
    State(services): State<Services>,
    principal: Principal,
    flash: Flash,
    Path(id): Path<String>,
) -> Result<Page<BookDetailsView>, AppError> {
    let id = BookId::from(id);
    let book = services
        .books
        .get_book_by_id::<BookDetails>(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("book '{}' not found", id)))?;

    let can_edit = can_edit_book(&principal, services.users.as_ref(), &book.publisher_id).await?;

    let all_tags = if can_edit {
        let tags = services.tags.list_tags().await?;
        Some(tags.into_iter().map(TagDisplay::from).collect())
    } else {
        None
    };

    Ok(Page::new(
        VIEW_DETAILS,
        BookDetailsView {
            book,
            can_edit,
            all_tags,
        },
    )
    .consume(flash))
}

/// Whether `book_id` exists and the caller may edit it
async fn editable(
    services: &Services,
    principal: &Principal,
    book_id: &BookId,
) -> anyhow::Result<bool> {
    match services.books.get_book_by_id::<BookDetails>(book_id).await? {
        Some(book) => can_edit_book(principal, services.users.as_ref(), &book.publisher_id).await,
        None => Ok(false),
    }
}

/// Both ids of a tag change; a body that does not decode counts as missing ids
fn assignment(form: Result<Form<TagAssignmentForm>, FormRejection>) -> Option<(BookId, TagId)> {
    match form {
        Ok(Form(form)) => form.ids(),
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "undecodable tag change");
            None
        }
    }
}

async fn add_tag_to_book(
    State(services): State<Services>,
    principal: Principal,
    form: Result<Form<TagAssignmentForm>, FormRejection>,
) -> Result<Ack, AppError> {
    let Some((book_id, tag_id)) = assignment(form) else {
        return Ok(Ack::failure());
    };

    if !editable(&services, &principal, &book_id).await? {
        tracing::info!(
            user = principal.name().unwrap_or_default(),
            book = %book_id,
            "tag change refused"
        );
        return Ok(Ack::failure());
    }

    let success = services.books.add_tag_to_book(&book_id, &tag_id).await?;
    Ok(Ack::new(success))
}

/// Reports success once the caller may edit the book, whether or not the tag
/// was attached before.
async fn remove_tag_from_book(
    State(services): State<Services>,
    principal: Principal,
    form: Result<Form<TagAssignmentForm>, FormRejection>,
) -> Result<Ack, AppError> {
    let Some((book_id, tag_id)) = assignment(form) else {
        return Ok(Ack::failure());
    };

    if !editable(&services, &principal, &book_id).await? {
        tracing::info!(
            user = principal.name().unwrap_or_default(),
            book = %book_id,
            "tag change refused"
        );
        return Ok(Ack::failure());
    }

    services.books.remove_tag_from_book(&book_id, &tag_id).await?;
    Ok(Ack::new(true))
}
