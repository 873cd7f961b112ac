use axum::{
    extract::{
        rejection::{FormRejection, QueryRejection},
        Query, State,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use kniga_authz::{enforce, Policy, Principal};
use kniga_http::{
    error::AppError,
    flash::{Flash, Notification},
    response::{Page, Redirect},
};
use time::OffsetDateTime;

use super::models::{BookConfirmPurchase, PurchaseListing, PurchaseRequest};
use crate::services::{BookId, NewPurchase, PurchaseOutcome, Services};
use crate::utils::{self, messages};

const VIEW_CONFIRM: &str = "purchase/confirm";
const VIEW_MY: &str = "purchase/my";

/// Routes of the purchase module, relative to `/api/purchase`; all of them
/// need an authenticated caller
pub fn router(services: Services) -> Router {
    Router::new()
        .route("/confirm", get(confirm))
        .route("/buy", post(buy))
        .route("/my", get(my_purchases))
        .route_layer(middleware::from_fn_with_state(Policy::Authenticated, enforce))
        .with_state(services)
}

fn buyer(principal: &Principal) -> Result<&str, AppError> {
    principal
        .name()
        .ok_or_else(|| AppError::unauthorized("authentication required"))
}

fn failed() -> Response {
    Redirect::to(utils::HOME)
        .notify(Notification::error(messages::PURCHASE_ERROR))
        .into_response()
}

/// A request that does not decode is treated like one without a book id
fn requested_book(request: Result<PurchaseRequest, String>) -> Option<BookId> {
    match request {
        Ok(request) => request.book_id(),
        Err(error) => {
            tracing::debug!(%error, "undecodable purchase request");
            None
        }
    }
}

async fn confirm(
    State(services): State<Services>,
    principal: Principal,
    flash: Flash,
    request: Result<Query<PurchaseRequest>, QueryRejection>,
) -> Result<Response, AppError> {
    let user_name = buyer(&principal)?;
    let request = request.map(|Query(request)| request).map_err(|e| e.body_text());

    let Some(book_id) = requested_book(request) else {
        return Ok(failed());
    };
    let Some(book) = services
        .books
        .get_book_by_id::<BookConfirmPurchase>(&book_id)
        .await?
    else {
        tracing::info!(user = user_name, book = %book_id, "confirmation for unknown book");
        return Ok(failed());
    };

    if services.purchases.has_purchased(&book_id, user_name).await? {
        return Ok(Redirect::to(utils::book_details(&book_id)).into_response());
    }

    Ok(Page::new(VIEW_CONFIRM, book).consume(flash).into_response())
}

async fn buy(
    State(services): State<Services>,
    principal: Principal,
    request: Result<Form<PurchaseRequest>, FormRejection>,
) -> Result<Response, AppError> {
    let user_name = buyer(&principal)?;
    let request = request.map(|Form(request)| request).map_err(|e| e.body_text());

    let Some(book_id) = requested_book(request) else {
        return Ok(failed());
    };

    if services.purchases.has_purchased(&book_id, user_name).await? {
        return Ok(Redirect::to(utils::book_details(&book_id)).into_response());
    }

    let purchase = NewPurchase {
        book_id: book_id.clone(),
        user_name: user_name.to_owned(),
        purchased_on: OffsetDateTime::now_utc(),
    };

    match services.purchases.create(purchase).await? {
        PurchaseOutcome::Recorded => {
            tracing::info!(user = user_name, book = %book_id, "book purchased");
            Ok(Redirect::to(utils::HOME)
                .notify(Notification::success(messages::PURCHASE_SUCCESS))
                .into_response())
        }
        PurchaseOutcome::AlreadyPurchased => {
            tracing::info!(
                user = user_name,
                book = %book_id,
                "concurrent duplicate purchase ignored"
            );
            Ok(Redirect::to(utils::book_details(&book_id)).into_response())
        }
        PurchaseOutcome::Rejected => {
            tracing::warn!(user = user_name, book = %book_id, "ledger rejected purchase");
            Ok(failed())
        }
    }
}

async fn my_purchases(
    State(services): State<Services>,
    principal: Principal,
    flash: Flash,
) -> Result<Page<Vec<PurchaseListing>>, AppError> {
    let user_name = buyer(&principal)?;
    let purchases = services.purchases.purchases_for_user(user_name).await?;

    Ok(Page::new(
        VIEW_MY,
        purchases.into_iter().map(PurchaseListing::from).collect(),
    )
    .consume(flash))
}
