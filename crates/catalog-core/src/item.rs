//! Items: free-form entries owned by the user who created them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  EntityKind, Resource, Result,
  payload::{Validate, check_optional, check_required, nullable},
  user::CurrentUser,
};

pub const TITLE_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
  pub id:          Uuid,
  pub title:       String,
  pub description: Option<String>,
  /// Items go away with their owner.
  pub owner_id:    Uuid,
}

impl Item {
  pub fn apply(&mut self, patch: ItemPatch) {
    if let Some(title) = patch.title {
      self.title = title;
    }
    if let Some(description) = patch.description {
      self.description = description;
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewItem {
  pub title:       String,
  pub description: Option<String>,
  /// Never read from the request; set from the authenticated actor.
  #[serde(skip)]
  pub owner_id:    Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemPatch {
  pub title:       Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemFilter {
  pub owner_id: Option<Uuid>,
}

impl Validate for NewItem {
  fn validate(&self) -> Result<()> {
    check_required("title", &self.title, TITLE_MAX)?;
    check_optional("description", self.description.as_deref(), DESCRIPTION_MAX)
  }
}

impl Validate for ItemPatch {
  fn validate(&self) -> Result<()> {
    if let Some(title) = &self.title {
      check_required("title", title, TITLE_MAX)?;
    }
    match &self.description {
      Some(description) => check_optional("description", description.as_deref(), DESCRIPTION_MAX),
      None => Ok(()),
    }
  }
}

impl Resource for Item {
  const KIND: EntityKind = EntityKind::Item;

  type New = NewItem;
  type Patch = ItemPatch;
  type Filter = ItemFilter;

  fn id(&self) -> Uuid { self.id }

  fn owner(&self) -> Option<Uuid> { Some(self.owner_id) }

  fn attribute(new: &mut NewItem, author: &CurrentUser) { new.owner_id = author.id; }
}
