use async_trait::async_trait;
use domains::{DomainError, DomainResult, NewUser, User, UserRepository};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::{column, db_err, label};

const USER_COLUMNS: &str = "id, email, username, password_hash, role, phone, is_verified, created_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user(row: &PgRow) -> DomainResult<User> {
    Ok(User {
        id: column(row, "id")?,
        email: column(row, "email")?,
        username: column(row, "username")?,
        password_hash: column(row, "password_hash")?,
        role: label(row, "role")?,
        phone: column(row, "phone")?,
        is_verified: column(row, "is_verified")?,
        created_at: column(row, "created_at")?,
    })
}

#[async_trait]
impl UserRepository for PgUserRepository {
    /// Uniqueness is enforced by the `users.email` constraint, so two
    /// concurrent registrations cannot both succeed.
    async fn insert(&self, user: NewUser) -> DomainResult<User> {
        let sql = format!(
            "INSERT INTO users (email, username, password_hash, role, phone) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(&user.phone)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        map_user(&row)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        row.as_ref().map(map_user).transpose()
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> DomainResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("user", id.to_string()));
        }
        Ok(())
    }

    async fn list_emails(&self) -> DomainResult<Vec<String>> {
        sqlx::query_scalar("SELECT email FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }
}
