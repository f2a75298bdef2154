//! # SMTP notifier
//!
//! Renders the warning once with askama, then sends one message per
//! recipient through an async lettre transport. A bad address or a refused
//! message is logged and skipped; the remaining recipients still get theirs.

use std::time::Duration;

use askama::Template;
use async_trait::async_trait;
use domains::{DomainError, DomainResult, Notifier, WarningLevel, WarningMessage};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::NotifyError;
use crate::warning_subject;

/// Connection and sender settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub from_address: String,
    pub from_name: Option<String>,
    /// `true` upgrades with STARTTLS; `false` speaks plain SMTP (local relays).
    pub starttls: bool,
    pub timeout: Duration,
}

#[derive(Template)]
#[template(path = "warning_email.html")]
struct WarningEmail<'a> {
    urgent: bool,
    affected_scope: &'a str,
    prevention_measures: &'a str,
    expire_time: String,
}

impl<'a> WarningEmail<'a> {
    fn from_warning(warning: &'a WarningMessage) -> Self {
        Self {
            urgent: warning.level == WarningLevel::Urgent,
            affected_scope: &warning.affected_scope,
            prevention_measures: &warning.prevention_measures,
            expire_time: warning.expire_time.format("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpNotifier {
    /// Builds the transport without connecting; the first send opens the connection.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotifyError> {
        let address: Address = config
            .from_address
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Address(config.from_address.clone(), e.to_string()))?;
        let sender = Mailbox::new(config.from_name.clone(), address);

        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| NotifyError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };
        builder = builder.port(config.port).timeout(Some(config.timeout));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(
                username.clone(),
                password.expose_secret().to_owned(),
            ));
        }

        Ok(Self { transport: builder.build(), sender })
    }

    fn render(warning: &WarningMessage) -> Result<String, NotifyError> {
        WarningEmail::from_warning(warning)
            .render()
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    fn message(&self, to: &str, subject: &str, body: &str) -> Result<Message, NotifyError> {
        let address: Address = to
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::Address(to.to_owned(), e.to_string()))?;
        Message::builder()
            .from(self.sender.clone())
            .to(Mailbox::new(None, address))
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body.to_owned())
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn broadcast_warning(&self, recipients: &[String], warning: &WarningMessage) -> DomainResult<usize> {
        let subject = warning_subject(warning);
        let body = Self::render(warning).map_err(DomainError::from)?;

        let mut sent = 0;
        for recipient in recipients {
            let message = match self.message(recipient, &subject, &body) {
                Ok(m) => m,
                Err(e) => {
                    warn!(error = %e, "skipping recipient");
                    continue;
                }
            };
            match self.transport.send(message).await {
                Ok(_) => {
                    sent += 1;
                    debug!(recipient = %recipient, "warning mail accepted");
                }
                Err(e) => warn!(recipient = %recipient, error = %e, "warning mail refused"),
            }
        }
        Ok(sent)
    }
}
