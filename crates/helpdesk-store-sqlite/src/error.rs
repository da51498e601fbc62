//! Error type for `helpdesk-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A UNIQUE, FOREIGN KEY or CHECK constraint rejected a write.
  #[error("constraint violated: {0}")]
  Conflict(String),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// Classify a failed write, splitting constraint violations from other
  /// database failures.
  pub(crate) fn from_write(err: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, message)) = &err
      && code.code == rusqlite::ErrorCode::ConstraintViolation
    {
      return Self::Conflict(message.clone().unwrap_or_else(|| code.to_string()));
    }
    Self::Database(err)
  }
}

impl From<Error> for helpdesk_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Conflict(message) => helpdesk_core::Error::Conflict(message),
      other => helpdesk_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
