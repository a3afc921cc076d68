//! Error type for `lectern-store-sqlite`.

use lectern_core::StoreFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The request was rejected before anything was written.
  #[error("{0}")]
  Core(#[from] lectern_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored value could not be turned back into a domain type.
  #[error("decode error: {0}")]
  Decode(String),
}

impl StoreFailure for Error {
  fn domain(&self) -> Option<&lectern_core::Error> {
    match self {
      Self::Core(e) => Some(e),
      _ => None,
    }
  }

  fn is_retryable(&self) -> bool { matches!(self, Self::Database(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
