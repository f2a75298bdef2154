use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid mail address {0:?}: {1}")]
    Address(String, String),

    #[error("mail transport setup failed: {0}")]
    Transport(String),

    #[error("could not render mail body: {0}")]
    Template(String),
}

impl From<NotifyError> for domains::DomainError {
    fn from(err: NotifyError) -> Self {
        domains::DomainError::Internal(err.to_string())
    }
}
