pub mod models;
pub mod policy;
pub mod routes;

use async_trait::async_trait;
use axum::Router;
use kniga_kernel::{InitCtx, Module};
use serde_json::json;

use self::models::{BookCreateForm, BookDetails, BookListing, TagAssignmentForm};
use crate::services::Services;
use crate::utils;

/// Book catalog browsing, publishing and tag assignment
pub struct BooksModule {
    services: Services,
}

impl BooksModule {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.services.books.list_books().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books = books.len(),
            "books module initialized"
        );
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
        let ack = json!({
            "description": "Acknowledgement; failures are reported in the body",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Ack" } } }
        });
        let redirect = json!({ "description": "Redirect; a notification may be pending in the flash cookie" });
        let error = json!({
            "description": "Error",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });
        let form = |schema: &str| {
            json!({
                "required": true,
                "content": {
                    "application/x-www-form-urlencoded": {
                        "schema": { "$ref": format!("#/components/schemas/{schema}") }
                    }
                }
            })
        };

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "Book listing page",
                        "tags": ["Books"],
                        "responses": { "200": page }
                    }
                },
                "/all": {
                    "get": {
                        "summary": "List every book",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "All books",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/BookListing" }
                                        }
                                    }
                                }
                            },
                            "500": error
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Book details; editors also receive every tag",
                        "tags": ["Books"],
                        "parameters": [{
                            "name": "id", "in": "path", "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": { "200": page, "404": error }
                    }
                },
                "/create": {
                    "get": {
                        "summary": "Book creation form",
                        "tags": ["Books"],
                        "responses": { "200": page, "401": error, "403": error }
                    },
                    "post": {
                        "summary": "Create a book owned by the caller's publisher",
                        "tags": ["Books"],
                        "requestBody": form("BookCreateForm"),
                        "responses": { "200": page, "303": redirect, "401": error, "403": error }
                    }
                },
                "/add-tag": {
                    "post": {
                        "summary": "Attach a tag to a book the caller may edit",
                        "tags": ["Books"],
                        "requestBody": form("TagAssignmentForm"),
                        "responses": { "200": ack, "401": error, "403": error }
                    }
                },
                "/remove-tag": {
                    "post": {
                        "summary": "Detach a tag from a book the caller may edit",
                        "tags": ["Books"],
                        "requestBody": form("TagAssignmentForm"),
                        "responses": { "200": ack, "401": error, "403": error }
                    }
                }
            },
            "components": {
                "schemas": {
                    "BookListing": utils::openapi_schema::<BookListing>(),
                    "BookDetails": utils::openapi_schema::<BookDetails>(),
                    "BookCreateForm": utils::openapi_schema::<BookCreateForm>(),
                    "TagAssignmentForm": utils::openapi_schema::<TagAssignmentForm>()
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(services: Services) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(services))
}
