//! The category tree, held as an arena keyed by id.
//!
//! Nodes never reference each other directly; a parent is just another key.
//! Every walk along parent links is bounded by `len + 1` steps, so even a
//! stored chain that already loops terminates (and is reported as a cycle).

use std::collections::HashMap;

use uuid::Uuid;

use crate::{EntityKind, Error, Result, category::Category};

#[derive(Debug, Clone, Default)]
pub struct CategoryTree {
  parents: HashMap<Uuid, Option<Uuid>>,
}

impl CategoryTree {
  pub fn contains(&self, id: Uuid) -> bool { self.parents.contains_key(&id) }

  /// Ancestors of `id`, nearest first, ending at a root.
  pub fn ancestors(&self, id: Uuid) -> Result<Vec<Uuid>> {
    let parent = self
      .parents
      .get(&id)
      .ok_or_else(|| Error::not_found(EntityKind::Category, id))?;
    match parent {
      None => Ok(Vec::new()),
      Some(parent) => self
        .chain_from(*parent)
        .ok_or(Error::Cycle { category: id, parent: *parent }),
    }
  }

  /// Check that `category` may be re-attached under `parent` (or made a root).
  pub fn check_parent(&self, category: Uuid, parent: Option<Uuid>) -> Result<()> {
    if !self.contains(category) {
      return Err(Error::not_found(EntityKind::Category, category));
    }
    let Some(parent) = parent else {
      return Ok(());
    };
    if !self.contains(parent) {
      return Err(Error::not_found(EntityKind::Category, parent));
    }
    match self.chain_from(parent) {
      Some(chain) if !chain.contains(&category) => Ok(()),
      _ => Err(Error::Cycle { category, parent }),
    }
  }

  /// [`check_parent`](Self::check_parent), then commit the new link.
  pub fn set_parent(&mut self, category: Uuid, parent: Option<Uuid>) -> Result<()> {
    self.check_parent(category, parent)?;
    self.parents.insert(category, parent);
    Ok(())
  }

  /// Follow parent links starting at (and including) `start`.
  ///
  /// Returns `None` if the walk exceeds the bound, i.e. the chain loops.
  fn chain_from(&self, start: Uuid) -> Option<Vec<Uuid>> {
    let bound = self.parents.len() + 1;
    let mut chain = Vec::new();
    let mut current = Some(start);
    while let Some(node) = current {
      if chain.len() >= bound {
        return None;
      }
      chain.push(node);
      current = self.parents.get(&node).copied().flatten();
    }
    Some(chain)
  }
}

impl FromIterator<(Uuid, Option<Uuid>)> for CategoryTree {
  fn from_iter<I: IntoIterator<Item = (Uuid, Option<Uuid>)>>(iter: I) -> Self {
    Self { parents: iter.into_iter().collect() }
  }
}

impl<'a> FromIterator<&'a Category> for CategoryTree {
  fn from_iter<I: IntoIterator<Item = &'a Category>>(iter: I) -> Self {
    iter.into_iter().map(|c| (c.id, c.parent_id)).collect()
  }
}
