//! Error type for `catalog-store-sqlite`.

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] catalog_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
}

impl Error {
  /// The SQLite constraint message, if this is a constraint violation.
  fn constraint_violation(&self) -> Option<String> {
    match self {
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
        failure,
        message,
      ))) if failure.code == ErrorCode::ConstraintViolation => Some(
        message
          .clone()
          .unwrap_or_else(|| "constraint violation".to_owned()),
      ),
      _ => None,
    }
  }
}

impl From<Error> for catalog_core::Error {
  fn from(err: Error) -> Self {
    if let Some(message) = err.constraint_violation() {
      return catalog_core::Error::Conflict(message);
    }
    match err {
      Error::Core(e) => e,
      other => catalog_core::Error::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
