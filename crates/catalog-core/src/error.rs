//! Error types for `catalog-core`.
//!
//! Every layer above the core converts its failures into [`Error`], so the
//! HTTP mapping lives in exactly one place (`catalog-api`).

use thiserror::Error;
use uuid::Uuid;

use crate::resource::EntityKind;

#[derive(Debug, Error)]
pub enum Error {
  /// The target id (or an id the payload references) does not exist.
  #[error("{kind} not found")]
  NotFound { kind: EntityKind, id: Uuid },

  #[error("{0}")]
  Forbidden(String),

  #[error("not authenticated")]
  Unauthenticated,

  #[error("validation failed: {0}")]
  Validation(String),

  /// A uniqueness or referential constraint would be violated.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("moving category {category} under {parent} would create a cycle")]
  Cycle { category: Uuid, parent: Uuid },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn not_found(kind: EntityKind, id: Uuid) -> Self {
    Self::NotFound { kind, id }
  }

  pub fn forbidden() -> Self { Self::Forbidden("not enough permissions".to_owned()) }

  pub fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
