//! # auth-adapters
//!
//! Credential primitives behind the `PasswordHasher` and `TokenService`
//! ports: Argon2id password hashing (always compiled) and HS256 JWT session
//! tokens (feature `auth-jwt`).

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2PasswordHasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;
