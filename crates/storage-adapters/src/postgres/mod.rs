//! # PostgreSQL repositories
//!
//! Runtime `sqlx::query` calls with manual row mapping. Labels (roles,
//! statuses, kinds) are stored as the same strings used on the wire and
//! parsed back through `FromStr`; an unknown label is reported as
//! [`DomainError::Corrupt`] instead of being defaulted.

use std::path::Path;
use std::str::FromStr;

use domains::{DomainError, ParseLabelError};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info};

mod content;
mod governance;
mod knowledge;
mod users;
mod warnings;

pub use content::PgContentRepository;
pub use governance::PgGovernanceRepository;
pub use knowledge::PgKnowledgeRepository;
pub use users::PgUserRepository;
pub use warnings::PgWarningRepository;

/// Applies every pending migration found in `dir`.
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<(), sqlx::migrate::MigrateError> {
    let migrator = sqlx::migrate::Migrator::new(dir).await?;
    migrator.run(pool).await?;
    info!(dir = %dir.display(), "database migrations applied");
    Ok(())
}

/// Maps driver failures; unique violations become conflicts whose message
/// never carries the server's text.
pub(crate) fn db_err(err: sqlx::Error) -> DomainError {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            debug!(constraint = db.constraint().unwrap_or("unknown"), "unique constraint violated");
            DomainError::Conflict(conflict_message(db.constraint()).to_owned())
        }
        _ => DomainError::internal(err),
    }
}

fn conflict_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_email_key") => "email already registered",
        _ => "duplicate value",
    }
}

pub(crate) fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::Corrupt(format!("column {name}: {e}")))
}

pub(crate) fn label<T>(row: &PgRow, name: &str) -> Result<T, DomainError>
where
    T: FromStr<Err = ParseLabelError>,
{
    let raw: String = column(row, name)?;
    raw.parse()
        .map_err(|e: ParseLabelError| DomainError::Corrupt(e.to_string()))
}

/// These need a disposable database: `DATABASE_URL=... cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        AuditDecision, AuditOutcome, ContentKind, ContentRepository, ContentStatus, DomainError,
        NewContent, NewUser, Role, UserRepository,
    };
    use sqlx::postgres::PgPoolOptions;

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPoolOptions::new().max_connections(2).connect(&url).await.unwrap();
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
        run_migrations(&pool, &dir).await.unwrap();
        pool
    }

    fn unique_email() -> String {
        format!("pg-{}@test.local", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    #[tokio::test]
    #[ignore]
    async fn duplicate_email_maps_to_conflict() {
        let repo = PgUserRepository::new(pool().await);
        let user = NewUser {
            email: unique_email(),
            username: "pg".into(),
            password_hash: "$argon2id$stub".into(),
            role: Role::Expert,
            phone: None,
        };
        let created = repo.insert(user.clone()).await.unwrap();
        assert_eq!(created.role, Role::Expert);
        assert_eq!(
            repo.insert(user).await.unwrap_err(),
            DomainError::Conflict("email already registered".into())
        );
    }

    #[test]
    fn conflict_messages_hide_constraint_names() {
        assert_eq!(conflict_message(Some("users_email_key")), "email already registered");
        assert_eq!(conflict_message(Some("pest_info_name_key")), "duplicate value");
        assert_eq!(conflict_message(None), "duplicate value");
    }

    #[tokio::test]
    #[ignore]
    async fn approval_commits_status_and_log_together() {
        let pool = pool().await;
        let users = PgUserRepository::new(pool.clone());
        let content = PgContentRepository::new(pool);

        let author = users
            .insert(NewUser {
                email: unique_email(),
                username: "author".into(),
                password_hash: "$argon2id$stub".into(),
                role: Role::Farmer,
                phone: None,
            })
            .await
            .unwrap();
        let post = content
            .insert(
                ContentKind::Post,
                author.id,
                NewContent { title: "Scab?".into(), body: "Spots on leaves".into(), category: "qa".into() },
            )
            .await
            .unwrap();

        let (after, entry) = content
            .record_audit(AuditDecision {
                target_id: post.id,
                target_kind: ContentKind::Post,
                auditor_id: author.id,
                outcome: AuditOutcome::Approved,
                feedback: None,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.status, ContentStatus::Published);
        assert_eq!(entry.target_kind, ContentKind::Post);

        let missing = AuditDecision {
            target_id: i64::MAX,
            target_kind: ContentKind::Post,
            auditor_id: author.id,
            outcome: AuditOutcome::Approved,
            feedback: None,
        };
        assert!(content.record_audit(missing).await.unwrap().is_none());
    }
}
