use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::HeaderName,
    middleware::Next,
    response::Response,
};
use kniga_http::error::AppError;

use crate::principal::Principal;
use crate::roles::RoleSet;

/// Looks up the roles granted to an already-authenticated user name
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn roles_for(&self, user_name: &str) -> anyhow::Result<RoleSet>;
}

/// State for [`resolve_principal`]: which header carries the user name set by
/// the authenticating proxy, and where roles come from
#[derive(Clone)]
pub struct IdentityState {
    header: HeaderName,
    resolver: Arc<dyn RoleResolver>,
}

impl IdentityState {
    pub fn new(header: &str, resolver: Arc<dyn RoleResolver>) -> anyhow::Result<Self> {
        let header = HeaderName::try_from(header)
            .map_err(|e| anyhow::anyhow!("invalid identity header '{}': {}", header, e))?;
        Ok(Self { header, resolver })
    }
}

/// Middleware inserting the caller's [`Principal`] into request extensions
pub async fn resolve_principal(
    State(state): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_name = request
        .headers()
        .get(&state.header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    let principal = match user_name {
        None => Principal::Anonymous,
        Some(name) => {
            let roles = state.resolver.roles_for(&name).await?;
            tracing::debug!(user = %name, roles = %roles, "resolved caller");
            Principal::user(name, roles)
        }
    };

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
