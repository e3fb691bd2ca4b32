//! Reviews: user-written feedback attached to a product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  EntityKind, Error, Resource, Result,
  payload::{Validate, check_required, nullable},
  user::CurrentUser,
};

pub const FULL_NAME_MAX: usize = 150;
pub const RATING_MIN: i32 = 1;
pub const RATING_MAX: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
  pub id:          Uuid,
  pub full_name:   String,
  pub description: Option<String>,
  /// In `RATING_MIN..=RATING_MAX` when present.
  pub rating:      Option<i32>,
  pub product_id:  Uuid,
  /// The author. `None` once the author's account is gone.
  pub user_id:     Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Review {
  /// Merge the supplied fields. `updated_at` is left to the store.
  pub fn apply(&mut self, patch: ReviewPatch) {
    if let Some(full_name) = patch.full_name {
      self.full_name = full_name;
    }
    if let Some(description) = patch.description {
      self.description = description;
    }
    if let Some(rating) = patch.rating {
      self.rating = rating;
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
  pub full_name:   String,
  pub description: Option<String>,
  pub rating:      Option<i32>,
  pub product_id:  Uuid,
  /// Never read from the request; set from the authenticated actor.
  #[serde(skip)]
  pub user_id:     Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPatch {
  pub full_name:   Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub description: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub rating:      Option<Option<i32>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewFilter {
  pub product_id: Option<Uuid>,
}

fn check_rating(rating: Option<i32>) -> Result<()> {
  match rating {
    Some(r) if !(RATING_MIN..=RATING_MAX).contains(&r) => Err(Error::validation(
      format!("rating must be between {RATING_MIN} and {RATING_MAX}"),
    )),
    _ => Ok(()),
  }
}

impl Validate for NewReview {
  fn validate(&self) -> Result<()> {
    check_required("full_name", &self.full_name, FULL_NAME_MAX)?;
    check_rating(self.rating)
  }
}

impl Validate for ReviewPatch {
  fn validate(&self) -> Result<()> {
    if let Some(full_name) = &self.full_name {
      check_required("full_name", full_name, FULL_NAME_MAX)?;
    }
    check_rating(self.rating.flatten())
  }
}

impl Resource for Review {
  const KIND: EntityKind = EntityKind::Review;

  type New = NewReview;
  type Patch = ReviewPatch;
  type Filter = ReviewFilter;

  fn id(&self) -> Uuid { self.id }

  fn owner(&self) -> Option<Uuid> { self.user_id }

  fn attribute(new: &mut NewReview, author: &CurrentUser) { new.user_id = Some(author.id); }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_review(body: &str) -> NewReview { serde_json::from_str(body).unwrap() }

  #[test]
  fn rating_outside_range_is_invalid() {
    let product = Uuid::new_v4();
    for rating in [0, 6, -1] {
      let r = new_review(&format!(
        r#"{{"full_name":"Ann","rating":{rating},"product_id":"{product}"}}"#
      ));
      assert!(matches!(r.validate(), Err(Error::Validation(_))), "rating {rating}");
    }
    for rating in 1..=5 {
      let r = new_review(&format!(
        r#"{{"full_name":"Ann","rating":{rating},"product_id":"{product}"}}"#
      ));
      assert!(r.validate().is_ok(), "rating {rating}");
    }
  }

  #[test]
  fn missing_rating_is_valid() {
    let r = new_review(&format!(
      r#"{{"full_name":"Ann","product_id":"{}"}}"#,
      Uuid::new_v4()
    ));
    assert!(r.validate().is_ok());
  }

  #[test]
  fn client_supplied_author_is_ignored() {
    let someone_else = Uuid::new_v4();
    let mut r = new_review(&format!(
      r#"{{"full_name":"Ann","product_id":"{}","user_id":"{someone_else}"}}"#,
      Uuid::new_v4()
    ));
    assert_eq!(r.user_id, None);

    let actor = CurrentUser { id: Uuid::new_v4(), is_superuser: false };
    Review::attribute(&mut r, &actor);
    assert_eq!(r.user_id, Some(actor.id));
  }

  #[test]
  fn patch_rating_out_of_range_is_invalid() {
    let patch: ReviewPatch = serde_json::from_str(r#"{"rating":6}"#).unwrap();
    assert!(patch.validate().is_err());
    let patch: ReviewPatch = serde_json::from_str(r#"{"rating":null}"#).unwrap();
    assert!(patch.validate().is_ok());
  }
}
