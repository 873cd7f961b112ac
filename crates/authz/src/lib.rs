//! Authorization for Kniga: who the caller is ([`Principal`]), what they hold
//! ([`RoleSet`]), and which routes they may reach ([`Policy`]).

pub mod identity;
pub mod policy;
pub mod principal;
pub mod roles;

pub use identity::{resolve_principal, IdentityState, RoleResolver};
pub use policy::{enforce, Decision, Policy};
pub use principal::Principal;
pub use roles::{Role, RoleSet};
