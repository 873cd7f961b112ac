pub mod models;

use async_trait::async_trait;
use axum::{
    extract::{rejection::FormRejection, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use kniga_authz::{enforce, Policy};
use kniga_http::{
    error::AppError,
    flash::{Flash, Notification},
    response::{Page, Redirect},
};
use kniga_kernel::{InitCtx, Module};
use serde_json::json;

use self::models::{TagCreateForm, TagDisplay};
use crate::services::Services;
use crate::utils::{self, messages};

const VIEW_CREATE: &str = "tags/create";

pub struct TagsModule {
    services: Services,
}

impl TagsModule {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Module for TagsModule {
    fn name(&self) -> &'static str {
        "tags"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let tags = self.services.tags.list_tags().await?;
        tracing::info!(module = self.name(), tags = tags.len(), "tags module initialized");
        Ok(())
    }

    fn routes(&self) -> Router {
        let admin = Router::new()
            .route("/create", get(create_form).post(create))
            .route_layer(middleware::from_fn_with_state(Policy::Administrator, enforce));

        Router::new()
            .route("/", get(list))
            .merge(admin)
            .with_state(self.services.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = json!({
            "description": "Error",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });
        let page = json!({
            "description": "Rendered page",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Page" } } }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List every tag",
                        "tags": ["Tags"],
                        "responses": {
                            "200": {
                                "description": "All tags, ordered by name",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/TagDisplay" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                "/create": {
                    "get": {
                        "summary": "Tag creation form",
                        "tags": ["Tags"],
                        "responses": { "200": page, "401": error, "403": error }
                    },
                    "post": {
                        "summary": "Create a tag",
                        "tags": ["Tags"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/TagCreateForm" }
                                }
                            }
                        },
                        "responses": {
                            "200": page,
                            "303": { "description": "Created; redirects home" },
                            "401": error,
                            "403": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "TagDisplay": utils::openapi_schema::<TagDisplay>(),
                    "TagCreateForm": utils::openapi_schema::<TagCreateForm>()
                }
            }
        }))
    }
}

async fn list(State(services): State<Services>) -> Result<Json<Vec<TagDisplay>>, AppError> {
    let tags = services.tags.list_tags().await?;
    Ok(Json(tags.into_iter().map(TagDisplay::from).collect()))
}

async fn create_form(flash: Flash) -> Page<TagCreateForm> {
    Page::new(VIEW_CREATE, TagCreateForm::default()).consume(flash)
}

async fn create(
    State(services): State<Services>,
    form: Result<Form<TagCreateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let failed = |form: TagCreateForm| {
        Page::new(VIEW_CREATE, form).notify(Notification::error(messages::TAG_CREATE_ERROR))
    };

    let name = match form.validate() {
        Ok(name) => name,
        Err(errors) => return Ok(failed(form).with_errors(errors).into_response()),
    };

    match services.tags.create_tag(&name).await? {
        Some(tag_id) => {
            tracing::info!(tag = %tag_id, name = %name, "tag created");
            Ok(Redirect::to(utils::HOME)
                .notify(Notification::success(messages::TAG_CREATE_SUCCESS))
                .into_response())
        }
        None => {
            tracing::info!(name = %name, "tag name already taken");
            Ok(failed(form).into_response())
        }
    }
}

/// Create a new instance of the tags module
pub fn create_module(services: Services) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(TagsModule::new(services))
}
