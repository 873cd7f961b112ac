//! Kniga application library
//!
//! Workflow modules (books, tags, publishers, purchases), the service traits
//! they depend on, and the bootstrap tying them to the HTTP stack.

pub mod modules;
pub mod services;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use axum::{middleware, Router};
use kniga_authz::{resolve_principal, IdentityState};
use kniga_kernel::{settings::Settings, InitCtx, ModuleRegistry};

use services::{DirectoryRoles, Services};

/// Registry holding every workflow module, wired to `services`
pub fn registry(services: &Services) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, services)?;
    Ok(registry)
}

/// Full application router: module routes, ambient layers and caller identity
pub fn router(
    settings: &Settings,
    registry: &ModuleRegistry,
    services: &Services,
) -> anyhow::Result<Router> {
    let identity = IdentityState::new(
        &settings.auth.user_header,
        Arc::new(DirectoryRoles(services.users.clone())),
    )?;

    Ok(kniga_http::build_router(registry, settings)
        .layer(middleware::from_fn_with_state(identity, resolve_principal)))
}

/// Seed the in-memory services, run the module lifecycle and serve until shutdown
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let services =
        Services::in_memory(&settings.seed).context("failed to seed in-memory services")?;
    let registry = registry(&services)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let app = router(&settings, &registry, &services)?;
    let served = kniga_http::start_server(app, &settings).await;

    registry.stop_modules().await?;
    served
}
