//! Error types for `lectern-core`.
//!
//! Every variant is a validation failure: the request referenced something
//! that does not exist or carried a value the model rejects. Storage
//! failures belong to the backend's own error type.

use thiserror::Error;

use crate::ids::{AcademicYearId, ClassId, SubjectId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("user not found: {0}")]
  UserNotFound(UserId),

  #[error("user {0} is not a teacher")]
  NotATeacher(UserId),

  #[error("academic year not found: {0}")]
  AcademicYearNotFound(AcademicYearId),

  #[error("subject not found: {0}")]
  SubjectNotFound(SubjectId),

  #[error("class not found: {0}")]
  ClassNotFound(ClassId),

  #[error("{field} {value:?} is already taken")]
  Duplicate { field: &'static str, value: String },

  #[error("invalid {field}: {reason}")]
  Invalid { field: &'static str, reason: String },

  /// A delete was refused because other rows still point at the entity.
  #[error("{entity} is still referenced by {dependents}")]
  InUse { entity: String, dependents: &'static str },
}

impl Error {
  /// `true` when the failure names an entity that does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::UserNotFound(_)
        | Self::AcademicYearNotFound(_)
        | Self::SubjectNotFound(_)
        | Self::ClassNotFound(_)
    )
  }

  pub fn in_use(entity: impl std::fmt::Display, dependents: &'static str) -> Self {
    Self::InUse { entity: entity.to_string(), dependents }
  }

  pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
    Self::Invalid { field, reason: reason.into() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Classification every backend error type exposes so that generic callers
/// (the HTTP layer) can tell validation failures from storage failures
/// without knowing the concrete backend.
pub trait StoreFailure {
  /// The domain validation failure behind this error, if that is what it is.
  fn domain(&self) -> Option<&Error>;

  /// `true` when retrying the same call may succeed. Every store operation
  /// converges to the same state on retry, so this is the case for all
  /// storage failures.
  fn is_retryable(&self) -> bool { self.domain().is_none() }
}
