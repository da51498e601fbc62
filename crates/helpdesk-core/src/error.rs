//! Error types for `helpdesk-core`.

use thiserror::Error;
use uuid::Uuid;

/// The input field a [`Error::Validation`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
  Name,
  Description,
  Domain,
  OrganizationId,
  ParentId,
  Limit,
  Offset,
  SortBy,
  SortOrder,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid {field}: {reason}")]
  Validation { field: Field, reason: String },

  #[error("circular reference: {0} cannot become its own ancestor")]
  CircularReference(Uuid),

  #[error("not found: {0}")]
  NotFound(Uuid),

  #[error("corrupt hierarchy: inconsistent parent links at {0}")]
  CorruptHierarchy(Uuid),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn validation(field: Field, reason: impl Into<String>) -> Self {
    Self::Validation { field, reason: reason.into() }
  }

  /// The offending field, for validation errors.
  pub fn field(&self) -> Option<Field> {
    match self {
      Self::Validation { field, .. } => Some(*field),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
