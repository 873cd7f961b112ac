//! Purchase confirmation, execution and history.
//!
//! The "already purchased" check before a write is advisory; the ledger
//! itself refuses a second (user, book) pair, and that outcome is handled the
//! same way as the pre-check.

pub mod models;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use kniga_kernel::{InitCtx, Module};
use serde_json::json;

use self::models::{BookConfirmPurchase, PurchaseListing};
use crate::services::Services;
use crate::utils;

pub struct PurchasesModule {
    services: Services,
}

impl PurchasesModule {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Module for PurchasesModule {
    fn name(&self) -> &'static str {
        "purchase"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "purchase module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.services.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let page = json!({
            "description": "Rendered page",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Page" } } }
        });
        let unauthorized = json!({
            "description": "No authenticated caller",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });
        let book_id = json!({ "type": "string" });

        Some(json!({
            "paths": {
                "/confirm": {
                    "get": {
                        "summary": "Confirmation page for buying a book",
                        "tags": ["Purchases"],
                        "parameters": [{
                            "name": "bookId", "in": "query", "required": true, "schema": book_id
                        }],
                        "responses": {
                            "200": page,
                            "303": { "description": "Unknown book (home) or already purchased (details)" },
                            "401": unauthorized
                        }
                    }
                },
                "/buy": {
                    "post": {
                        "summary": "Buy a book",
                        "tags": ["Purchases"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": {
                                        "type": "object",
                                        "properties": { "bookId": book_id },
                                        "required": ["bookId"]
                                    }
                                }
                            }
                        },
                        "responses": {
                            "303": { "description": "Purchased or refused (home) or already purchased (details)" },
                            "401": unauthorized
                        }
                    }
                },
                "/my": {
                    "get": {
                        "summary": "Purchases of the caller",
                        "tags": ["Purchases"],
                        "responses": { "200": page, "401": unauthorized }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookConfirmPurchase": utils::openapi_schema::<BookConfirmPurchase>(),
                    "PurchaseListing": utils::openapi_schema::<PurchaseListing>()
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "purchase module stopped");
        Ok(())
    }
}

/// Create a new instance of the purchase module
pub fn create_module(services: Services) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(PurchasesModule::new(services))
}
