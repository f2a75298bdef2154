//! # Credential Store
//!
//! Registration, password authentication and password changes. Plaintext
//! passwords only ever pass through here on their way to the hasher.

use std::sync::Arc;

use domains::{DomainError, NewUser, PasswordHasher, Role, User, UserRepository};
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};

const EMAIL_TAKEN: &str = "email already registered";

/// Input for [`UserService::register`]. Shape checks (email format, password
/// length) happen at the boundary before this is built.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    /// Creates an account. Fails with `Conflict` when the email is taken.
    pub async fn register(&self, registration: Registration) -> ServiceResult<User> {
        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(ServiceError::Conflict(EMAIL_TAKEN.into()));
        }

        let password_hash = self.hasher.hash(&registration.password).await?;
        // The store's unique index still guards against a concurrent insert.
        let user = self
            .users
            .insert(NewUser {
                email: registration.email,
                username: registration.username,
                password_hash,
                role: registration.role,
                phone: registration.phone,
            })
            .await
            .map_err(|e| match e {
                DomainError::Conflict(_) => ServiceError::Conflict(EMAIL_TAKEN.into()),
                other => other.into(),
            })?;

        info!(user_id = user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// Returns the account when `password` matches, `None` otherwise.
    pub async fn authenticate(&self, email: &str, password: &str) -> ServiceResult<Option<User>> {
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("login for unknown email");
            return Ok(None);
        };

        if self.hasher.verify(password, &user.password_hash).await? {
            Ok(Some(user))
        } else {
            debug!(user_id = user.id, "login with wrong password");
            Ok(None)
        }
    }

    /// Re-hashes and stores a new password. The caller must already have
    /// authenticated `user`.
    pub async fn change_password(&self, user: &User, new_password: &str) -> ServiceResult<()> {
        let password_hash = self.hasher.hash(new_password).await?;
        self.users.update_password_hash(user.id, &password_hash).await?;
        info!(user_id = user.id, "password changed");
        Ok(())
    }

    pub async fn get(&self, id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }
}
