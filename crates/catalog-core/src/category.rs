//! Categories: nodes of a tree linked by a nullable parent pointer.
//!
//! The tree shape itself (cycle checks, children, ancestry) is handled by
//! [`crate::hierarchy`]; this module only holds the row type and its payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  EntityKind, Resource, Result,
  payload::{Validate, check_required, nullable},
};

pub const NAME_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:        Uuid,
  pub name:      String,
  /// `None` for a root category.
  pub parent_id: Option<Uuid>,
}

impl Category {
  pub fn is_root(&self) -> bool { self.parent_id.is_none() }

  /// Merge the supplied fields. The caller is responsible for having checked
  /// a parent change against the hierarchy first.
  pub fn apply(&mut self, patch: CategoryPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(parent_id) = patch.parent_id {
      self.parent_id = parent_id;
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCategory {
  pub name:      String,
  #[serde(default)]
  pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryPatch {
  pub name:      Option<String>,
  /// `Some(None)` detaches the category and makes it a root.
  #[serde(default, deserialize_with = "nullable")]
  pub parent_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryFilter {
  /// Only return categories without a parent.
  #[serde(default)]
  pub roots_only: bool,
  /// Only return direct children of this category.
  pub parent_id:  Option<Uuid>,
}

impl Validate for NewCategory {
  fn validate(&self) -> Result<()> { check_required("name", &self.name, NAME_MAX) }
}

impl Validate for CategoryPatch {
  fn validate(&self) -> Result<()> {
    match &self.name {
      Some(name) => check_required("name", name, NAME_MAX),
      None => Ok(()),
    }
  }
}

impl Resource for Category {
  const KIND: EntityKind = EntityKind::Category;

  type New = NewCategory;
  type Patch = CategoryPatch;
  type Filter = CategoryFilter;

  fn id(&self) -> Uuid { self.id }
}
