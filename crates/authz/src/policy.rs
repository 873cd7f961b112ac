use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use kniga_http::error::AppError;

use crate::principal::Principal;
use crate::roles::Role;

/// Route-level access policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Any signed-in user
    Authenticated,
    /// Users holding the administrator or the publisher role
    AdministratorOrPublisher,
    Administrator,
}

/// Outcome of evaluating a [`Policy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No identity; the caller has to sign in first
    Challenge,
    /// Signed in, but without the required role
    Forbid,
}

impl Policy {
    pub fn evaluate(self, principal: &Principal) -> Decision {
        if !principal.is_authenticated() {
            return Decision::Challenge;
        }

        let allowed = match self {
            Policy::Authenticated => true,
            Policy::AdministratorOrPublisher => {
                principal.has_role(Role::Administrator) || principal.has_role(Role::Publisher)
            }
            Policy::Administrator => principal.has_role(Role::Administrator),
        };

        if allowed {
            Decision::Allow
        } else {
            Decision::Forbid
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Policy::Authenticated => "authenticated",
            Policy::AdministratorOrPublisher => "administrator_or_publisher",
            Policy::Administrator => "administrator",
        }
    }
}

/// Middleware gating the wrapped routes by `policy`; mount with
/// `route_layer(middleware::from_fn_with_state(policy, enforce))`
pub async fn enforce(
    State(policy): State<Policy>,
    principal: Principal,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match policy.evaluate(&principal) {
        Decision::Allow => Ok(next.run(request).await),
        Decision::Challenge => {
            tracing::debug!(
                policy = policy.name(),
                path = %request.uri().path(),
                "anonymous caller challenged"
            );
            Err(AppError::unauthorized("authentication required"))
        }
        Decision::Forbid => {
            tracing::info!(
                policy = policy.name(),
                user = principal.name().unwrap_or_default(),
                path = %request.uri().path(),
                "caller refused by policy"
            );
            Err(AppError::forbidden(format!(
                "policy '{}' does not admit this user",
                policy.name()
            )))
        }
    }
}
