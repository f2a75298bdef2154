//! fruit-health-cloud server.
//!
//! Wires settings, storage, credentials and mail into the services and serves
//! the axum router until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::{router, AppState, Metrics};
use auth_adapters::{Argon2PasswordHasher, JwtTokenService};
use configs::{LogFormat, LogSettings, MailSettings, Settings};
use domains::{
    ContentRepository, GovernanceRepository, KnowledgeRepository, Notifier, UserRepository,
    WarningRepository,
};
use notify_adapters::{LogNotifier, SmtpConfig, SmtpNotifier};
use secrecy::ExposeSecret;
use services::{
    AccessGate, CommunityService, GovernanceService, KnowledgeService, NotificationDispatcher,
    UserService, WarningService,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use storage_adapters::postgres::{
    run_migrations, PgContentRepository, PgGovernanceRepository, PgKnowledgeRepository,
    PgUserRepository, PgWarningRepository,
};
use storage_adapters::{
    MemoryContentRepository, MemoryGovernanceRepository, MemoryKnowledgeRepository,
    MemoryUserRepository, MemoryWarningRepository,
};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Repositories {
    users: Arc<dyn UserRepository>,
    content: Arc<dyn ContentRepository>,
    governance: Arc<dyn GovernanceRepository>,
    knowledge: Arc<dyn KnowledgeRepository>,
    warnings: Arc<dyn WarningRepository>,
}

impl Repositories {
    fn in_memory() -> Self {
        Self {
            users: Arc::new(MemoryUserRepository::new()),
            content: Arc::new(MemoryContentRepository::new()),
            governance: Arc::new(MemoryGovernanceRepository::new()),
            knowledge: Arc::new(MemoryKnowledgeRepository::new()),
            warnings: Arc::new(MemoryWarningRepository::new()),
        }
    }

    fn postgres(pool: &PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            content: Arc::new(PgContentRepository::new(pool.clone())),
            governance: Arc::new(PgGovernanceRepository::new(pool.clone())),
            knowledge: Arc::new(PgKnowledgeRepository::new(pool.clone())),
            warnings: Arc::new(PgWarningRepository::new(pool.clone())),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading settings")?;
    init_tracing(&settings.log);

    let pool = connect(&settings).await?;
    let repos = match &pool {
        Some(pool) => Repositories::postgres(pool),
        None => Repositories::in_memory(),
    };

    let hasher = Arc::new(Argon2PasswordHasher::new());
    let tokens = Arc::new(JwtTokenService::new(
        &settings.auth.jwt_secret,
        chrono::Duration::minutes(settings.auth.token_ttl_minutes),
    ));
    let notifier = notifier(&settings.mail)?;
    let dispatcher = NotificationDispatcher::new(
        repos.users.clone(),
        notifier,
        Duration::from_secs(settings.mail.per_recipient_budget_secs),
    );

    let state = AppState {
        users: Arc::new(UserService::new(repos.users.clone(), hasher)),
        gate: Arc::new(AccessGate::new(repos.users.clone(), tokens)),
        community: Arc::new(CommunityService::new(repos.content)),
        governance: Arc::new(GovernanceService::new(repos.governance)),
        knowledge: Arc::new(KnowledgeService::new(repos.knowledge)),
        warnings: Arc::new(WarningService::new(repos.warnings, dispatcher)),
        metrics: Arc::new(Metrics::new()),
    };

    let addr = settings.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "fruit-health-cloud listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;

    if let Some(pool) = pool {
        let limit = Duration::from_secs(settings.database.shutdown_timeout_secs);
        if tokio::time::timeout(limit, pool.close()).await.is_err() {
            warn!(timeout_secs = limit.as_secs(), "database pool did not close in time");
        }
    }

    info!("shutdown complete");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Opens the pool and applies migrations when `database.url` is set.
async fn connect(settings: &Settings) -> anyhow::Result<Option<PgPool>> {
    let Some(url) = &settings.database.url else {
        warn!("database.url not set; using in-memory storage, data is lost on exit");
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
        .connect(url.expose_secret())
        .await
        .context("connecting to postgres")?;
    info!(max_connections = settings.database.max_connections, "database pool ready");

    if settings.database.run_migrations {
        run_migrations(&pool, &settings.database.migrations_dir)
            .await
            .context("running migrations")?;
    }
    Ok(Some(pool))
}

fn notifier(mail: &MailSettings) -> anyhow::Result<Arc<dyn Notifier>> {
    if !mail.enabled {
        info!("mail disabled; warnings are broadcast to the log");
        return Ok(Arc::new(LogNotifier::new()));
    }

    let config = SmtpConfig {
        host: mail.smtp_host.clone(),
        port: mail.smtp_port,
        username: mail.username.clone(),
        password: mail.password.clone(),
        from_address: mail.from_address.clone(),
        from_name: mail.from_name.clone(),
        starttls: mail.starttls,
        timeout: Duration::from_secs(mail.timeout_secs),
    };
    let notifier = SmtpNotifier::new(&config).context("configuring smtp")?;
    info!(host = %mail.smtp_host, port = mail.smtp_port, "smtp notifier ready");
    Ok(Arc::new(notifier))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
