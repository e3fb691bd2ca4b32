//! The capability trait that plugs an entity kind into the generic CRUD layer.

use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{payload::Validate, user::CurrentUser};

/// The closed set of entity kinds known to the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
  User,
  Category,
  Product,
  Review,
  Item,
}

impl EntityKind {
  pub fn label(self) -> &'static str {
    match self {
      EntityKind::User => "User",
      EntityKind::Category => "Category",
      EntityKind::Product => "Product",
      EntityKind::Review => "Review",
      EntityKind::Item => "Item",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

/// An entity kind served by the generic orchestrator.
///
/// Implemented by the entity types themselves ([`Category`](crate::category::Category),
/// [`Product`](crate::product::Product), [`Review`](crate::review::Review),
/// [`Item`](crate::item::Item)).
/// Storage backends implement [`Repository<R>`](crate::store::Repository)
/// once per kind.
pub trait Resource: Serialize + Clone + Send + Sync + 'static {
  const KIND: EntityKind;

  /// Body accepted on create.
  type New: DeserializeOwned + Validate + Send + 'static;
  /// Body accepted on partial update.
  type Patch: DeserializeOwned + Validate + Send + 'static;
  /// Query-string filter accepted on list.
  type Filter: DeserializeOwned + Default + Send + 'static;

  fn id(&self) -> Uuid;

  /// The user allowed to mutate this entity besides superusers, if any.
  fn owner(&self) -> Option<Uuid> { None }

  /// Stamp server-controlled authorship onto a create payload.
  fn attribute(_new: &mut Self::New, _author: &CurrentUser) {}
}
