//! # Access Control Gate
//!
//! Two independent stages: [`AccessGate::authenticate`] turns a bearer token
//! into a principal, [`authorize`] checks that principal against the role
//! set an operation declares. Per-user resources add
//! [`ensure_owner_or_admin`] on top.

use std::sync::Arc;

use domains::{Role, TokenService, User, UserRepository};
use tracing::debug;

use crate::error::{ServiceError, ServiceResult};

/// Role sets declared by guarded operations.
pub mod roles {
    use domains::Role;

    pub const EXPERT_OR_ADMIN: &[Role] = &[Role::Expert, Role::Admin];
    pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
}

pub struct AccessGate {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenService>,
}

impl AccessGate {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Signs a session token for `user` with the configured lifetime.
    pub fn issue_session(&self, user: &User) -> ServiceResult<String> {
        self.tokens
            .issue(user.id, self.tokens.default_ttl())
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Resolves a bearer token to a live principal.
    ///
    /// A bad signature, a malformed payload, an expired token and a deleted
    /// account all produce the same `Unauthenticated` error.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<User> {
        let principal_id = self.tokens.verify(token).map_err(|e| {
            debug!(error = %e, "token rejected");
            ServiceError::Unauthenticated
        })?;

        match self.users.find_by_id(principal_id).await? {
            Some(user) => Ok(user),
            None => {
                debug!(user_id = principal_id, "token subject no longer exists");
                Err(ServiceError::Unauthenticated)
            }
        }
    }
}

/// Fails with `Forbidden` unless the principal's role is one of `allowed`.
pub fn authorize(user: &User, allowed: &[Role]) -> ServiceResult<()> {
    if user.role.is_in(allowed) {
        Ok(())
    } else {
        debug!(user_id = user.id, role = %user.role, "role not permitted");
        Err(ServiceError::Forbidden("insufficient role for this operation".into()))
    }
}

/// Fails with `Forbidden` unless the principal owns the resource or is an admin.
pub fn ensure_owner_or_admin(user: &User, owner_id: i64) -> ServiceResult<()> {
    if user.id == owner_id || user.role == Role::Admin {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("not the owner of this resource".into()))
    }
}
