//! The store traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g.
//! `catalog-store-sqlite`). Higher layers (`catalog-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Resource,
  category::Category,
  user::{Credentials, NewUser, User},
};

// ─── Query types ─────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_SIZE: u64 = 100;
pub const MAX_PAGE_SIZE: u64 = 1000;

/// An offset/limit window over a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
  pub offset: u64,
  pub limit:  u64,
}

impl Page {
  pub fn new(offset: u64, limit: u64) -> Self { Self { offset, limit } }

  /// Clamp `limit` to `max`.
  pub fn clamped(self, max: u64) -> Self {
    Self { limit: self.limit.min(max), ..self }
  }
}

impl Default for Page {
  fn default() -> Self { Self::new(0, DEFAULT_PAGE_SIZE) }
}

/// One page of results plus the number of rows matching the filter overall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing<T> {
  pub data:  Vec<T>,
  pub count: u64,
}

/// The `updated_at` value to record for a mutation of a row last touched at
/// `previous`: now, but always strictly later than `previous`.
pub fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
  Utc::now().max(previous + TimeDelta::microseconds(1))
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Capabilities of a catalog backend that are not tied to one resource kind.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CatalogStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with a conflict if the email is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by email, for authentication.
  fn find_credentials(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  // ── Category hierarchy ────────────────────────────────────────────────

  /// Re-attach a category under `parent_id`, or make it a root with `None`.
  ///
  /// Fails with [`Error::Cycle`](crate::Error::Cycle) if `parent_id` is the
  /// category itself or one of its descendants, and with not-found if either
  /// id does not exist.
  fn set_parent(
    &self,
    category_id: Uuid,
    parent_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  /// Ancestors of a category, nearest first. Not-found if it is absent.
  fn ancestors_of(
    &self,
    category_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;
}

/// The CRUD capability set for one resource kind.
///
/// Every method runs as a single atomic unit: it either fully succeeds and is
/// visible to subsequent reads, or fails without partial state.
pub trait Repository<R: Resource>: CatalogStore {
  /// Retrieve an entity by id. Returns `None` if not found.
  fn get(&self, id: Uuid) -> impl Future<Output = Result<Option<R>, Self::Error>> + Send + '_;

  /// A page of entities matching `filter`, in a stable order, with the total
  /// match count independent of `page`.
  fn list(
    &self,
    filter: R::Filter,
    page: Page,
  ) -> impl Future<Output = Result<Listing<R>, Self::Error>> + Send + '_;

  /// Persist a new entity. Referenced ids must exist.
  fn create(&self, input: R::New) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  /// Merge the supplied fields onto the stored entity.
  fn update(
    &self,
    id: Uuid,
    patch: R::Patch,
  ) -> impl Future<Output = Result<R, Self::Error>> + Send + '_;

  fn delete(&self, id: Uuid) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
