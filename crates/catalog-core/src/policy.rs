//! Authorization policy: who may do what to which entity.
//!
//! The rules are pure: no store access, no I/O. Callers fetch the target first
//! (so a missing id is reported as not-found before any permission check) and
//! then ask [`authorize`].

use uuid::Uuid;

use crate::{EntityKind, Error, Resource, Result, user::CurrentUser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
  Read,
  Create,
  Update,
  Delete,
}

/// The entity an action is aimed at, reduced to what the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
  pub kind:  EntityKind,
  pub owner: Option<Uuid>,
}

impl Target {
  /// A target that does not exist yet (creation).
  pub fn new(kind: EntityKind) -> Self { Self { kind, owner: None } }

  pub fn of<R: Resource>(entity: &R) -> Self {
    Self { kind: R::KIND, owner: entity.owner() }
  }
}

/// Decide whether `actor` may perform `action` on `target`.
pub fn can(actor: Option<&CurrentUser>, action: Action, target: Target) -> bool {
  if action == Action::Read {
    return true;
  }
  let Some(actor) = actor else {
    return false;
  };
  if actor.is_superuser {
    return true;
  }
  match (target.kind, action) {
    (EntityKind::Review | EntityKind::Item, Action::Create) => true,
    (EntityKind::Review | EntityKind::Item, Action::Update | Action::Delete) => {
      target.owner == Some(actor.id)
    }
    _ => false,
  }
}

/// Like [`can`], but reports *why* a request is refused.
pub fn authorize(actor: Option<&CurrentUser>, action: Action, target: Target) -> Result<()> {
  if can(actor, action, target) {
    Ok(())
  } else if actor.is_none() {
    Err(Error::Unauthenticated)
  } else {
    Err(Error::forbidden())
  }
}
