use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::roles::{Role, RoleSet};

/// The caller of the current request as seen by authorization checks.
///
/// Inserted into request extensions by [`crate::resolve_principal`]; handlers
/// extract it directly and get [`Principal::Anonymous`] if nothing resolved one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Principal {
    #[default]
    Anonymous,
    User { name: String, roles: RoleSet },
}

impl Principal {
    pub fn user(name: impl Into<String>, roles: RoleSet) -> Self {
        Self::User {
            name: name.into(),
            roles,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User { .. })
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Principal::Anonymous => None,
            Principal::User { name, .. } => Some(name),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        match self {
            Principal::Anonymous => false,
            Principal::User { roles, .. } => roles.contains(role),
        }
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Principal>().cloned().unwrap_or_default())
    }
}
