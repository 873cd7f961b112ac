use async_trait::async_trait;
use axum::Router;

use crate::settings::Settings;

/// What a module sees while the application boots
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
}

/// A workflow area of the application with its own route prefix.
///
/// The registry calls `init` then `start` on every module in registration
/// order before the server binds, and `stop` in reverse order after it shuts
/// down.
#[async_trait]
pub trait Module: Sync + Send {
    /// Also the route prefix: routes are served under `/api/{name}`
    fn name(&self) -> &'static str;

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment with `paths` relative to the module prefix and any
    /// `components.schemas` those paths reference
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
