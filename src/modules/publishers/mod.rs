//! Administrator-only provisioning of publisher accounts.

use async_trait::async_trait;
use axum::{
    extract::{rejection::FormRejection, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Form, Router,
};
use kniga_authz::{enforce, Policy};
use kniga_http::{
    error::AppError,
    flash::{Flash, Notification},
    response::{FieldError, Page, Redirect},
};
use kniga_kernel::Module;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::services::{NewPublisher, Services};
use crate::utils::{self, char_len, messages};

const VIEW_CREATE: &str = "publishers/create";
const NAME_MAX: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PublisherCreateForm {
    #[schema(max_length = 100)]
    pub name: String,
    /// Existing user account the publisher is linked to
    pub user_name: String,
}

impl PublisherCreateForm {
    pub fn validate(&self) -> Result<NewPublisher, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "required"));
        } else if char_len(name) > NAME_MAX {
            errors.push(FieldError::new("name", format!("at most {NAME_MAX} characters")));
        }

        let user_name = self.user_name.trim();
        if user_name.is_empty() {
            errors.push(FieldError::new("userName", "required"));
        }

        if errors.is_empty() {
            Ok(NewPublisher {
                name: name.to_owned(),
                user_name: user_name.to_owned(),
            })
        } else {
            Err(errors)
        }
    }
}

pub struct PublishersModule {
    services: Services,
}

impl PublishersModule {
    pub fn new(services: Services) -> Self {
        Self { services }
    }
}

#[async_trait]
impl Module for PublishersModule {
    fn name(&self) -> &'static str {
        "publishers"
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/create", get(create_form).post(create))
            .route_layer(middleware::from_fn_with_state(Policy::Administrator, enforce))
            .with_state(self.services.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let page = json!({
            "description": "Rendered page",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Page" } } }
        });
        let error = json!({
            "description": "Error",
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
        });

        Some(json!({
            "paths": {
                "/create": {
                    "get": {
                        "summary": "Publisher provisioning form",
                        "tags": ["Publishers"],
                        "responses": { "200": page, "401": error, "403": error }
                    },
                    "post": {
                        "summary": "Link a new publisher to an existing user",
                        "tags": ["Publishers"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/x-www-form-urlencoded": {
                                    "schema": { "$ref": "#/components/schemas/PublisherCreateForm" }
                                }
                            }
                        },
                        "responses": {
                            "200": page,
                            "303": { "description": "Provisioned; redirects home" },
                            "401": error,
                            "403": error
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "PublisherCreateForm": utils::openapi_schema::<PublisherCreateForm>()
                }
            }
        }))
    }
}

async fn create_form(flash: Flash) -> Page<PublisherCreateForm> {
    Page::new(VIEW_CREATE, PublisherCreateForm::default()).consume(flash)
}

async fn create(
    State(services): State<Services>,
    form: Result<Form<PublisherCreateForm>, FormRejection>,
) -> Result<Response, AppError> {
    let Form(form) = form?;
    let failed = |form: PublisherCreateForm| {
        Page::new(VIEW_CREATE, form).notify(Notification::error(messages::PUBLISHER_CREATE_ERROR))
    };

    let publisher = match form.validate() {
        Ok(publisher) => publisher,
        Err(errors) => return Ok(failed(form).with_errors(errors).into_response()),
    };
    let user_name = publisher.user_name.clone();

    match services.users.create_publisher(publisher).await? {
        Some(publisher_id) => {
            tracing::info!(user = %user_name, publisher = %publisher_id, "publisher provisioned");
            Ok(Redirect::to(utils::HOME)
                .notify(Notification::success(messages::PUBLISHER_CREATE_SUCCESS))
                .into_response())
        }
        None => {
            tracing::warn!(user = %user_name, "directory refused publisher");
            Ok(failed(form).into_response())
        }
    }
}

/// Create a new instance of the publishers module
pub fn create_module(services: Services) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(PublishersModule::new(services))
}
