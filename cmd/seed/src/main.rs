//! Bootstraps the first administrator.
//!
//! ```text
//! DATABASE_URL=postgres://... SEED_ADMIN_EMAIL=admin@farm.example \
//!     SEED_ADMIN_PASSWORD=... cargo run -p seed
//! ```
//!
//! Applies migrations, then creates the account with role `ADMIN`. An
//! existing account with that email is promoted instead; its password is left
//! alone.

use std::path::Path;

use anyhow::{bail, Context};
use auth_adapters::Argon2PasswordHasher;
use domains::{NewUser, PasswordHasher, Role, UserRepository};
use sqlx::postgres::PgPoolOptions;
use storage_adapters::postgres::{run_migrations, PgUserRepository};
use tracing::info;

const MIN_PASSWORD_LEN: usize = 6;

fn required(key: &str) -> anyhow::Result<String> {
    std::env::var(key).with_context(|| format!("{key} must be set"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter("info").init();

    let database_url = required("DATABASE_URL")?;
    let email = required("SEED_ADMIN_EMAIL")?;
    let password = required("SEED_ADMIN_PASSWORD")?;
    let username = std::env::var("SEED_ADMIN_USERNAME").unwrap_or_else(|_| "admin".into());
    if password.len() < MIN_PASSWORD_LEN {
        bail!("SEED_ADMIN_PASSWORD must be at least {MIN_PASSWORD_LEN} characters");
    }

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .context("connecting to postgres")?;
    run_migrations(&pool, Path::new("migrations")).await?;

    let users = PgUserRepository::new(pool.clone());
    match users.find_by_email(&email).await? {
        Some(user) if user.role == Role::Admin => {
            info!(user_id = user.id, "administrator already present");
        }
        Some(user) => {
            sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
                .bind(Role::Admin.as_str())
                .bind(user.id)
                .execute(&pool)
                .await
                .context("promoting account")?;
            info!(user_id = user.id, from = %user.role, "account promoted to administrator");
        }
        None => {
            let password_hash = Argon2PasswordHasher::new().hash(&password).await?;
            let user = users
                .insert(NewUser {
                    email,
                    username,
                    password_hash,
                    role: Role::Admin,
                    phone: None,
                })
                .await?;
            info!(user_id = user.id, "administrator created");
        }
    }

    pool.close().await;
    Ok(())
}
