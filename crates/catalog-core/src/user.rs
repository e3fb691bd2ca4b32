//! Users and the authenticated actor.
//!
//! Password hashing is the caller's business: the store only ever sees an
//! opaque PHC string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:           Uuid,
  pub email:        String,
  pub full_name:    Option<String>,
  pub is_active:    bool,
  pub is_superuser: bool,
  pub created_at:   DateTime<Utc>,
}

/// Input for [`CatalogStore::create_user`](crate::store::CatalogStore::create_user).
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  pub full_name:     Option<String>,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub is_active:     bool,
  pub is_superuser:  bool,
}

/// A user together with the stored password hash, for authentication only.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

/// The identity performing a request, as seen by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
  pub id:           Uuid,
  pub is_superuser: bool,
}

impl From<&User> for CurrentUser {
  fn from(user: &User) -> Self {
    Self { id: user.id, is_superuser: user.is_superuser }
  }
}
