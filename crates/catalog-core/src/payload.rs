//! Helpers shared by create and partial-update payloads.
//!
//! A patch field is `Option<T>` when the column is non-nullable (absent means
//! "keep") and `Option<Option<T>>` when it is nullable (absent means "keep",
//! `null` means "clear"). The latter needs [`nullable`], since serde's default
//! collapses an explicit `null` into `None`.

use serde::{Deserialize, Deserializer};

use crate::{Error, Result};

/// Payload-shape checks run after authorization and before the store write.
pub trait Validate {
  fn validate(&self) -> Result<()>;
}

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Use together with `#[serde(default)]` so that a missing field stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Reject blank or over-long text.
pub fn check_required(field: &str, value: &str, max: usize) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::validation(format!("{field} must not be empty")));
  }
  check_max(field, value, max)
}

pub fn check_max(field: &str, value: &str, max: usize) -> Result<()> {
  if value.chars().count() > max {
    return Err(Error::validation(format!(
      "{field} must be at most {max} characters"
    )));
  }
  Ok(())
}

pub fn check_optional(field: &str, value: Option<&str>, max: usize) -> Result<()> {
  value.map_or(Ok(()), |v| check_max(field, v, max))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Debug, Deserialize)]
  struct Sample {
    #[serde(default, deserialize_with = "nullable")]
    note: Option<Option<String>>,
  }

  #[test]
  fn missing_field_is_none() {
    let s: Sample = serde_json::from_str("{}").unwrap();
    assert_eq!(s.note, None);
  }

  #[test]
  fn explicit_null_is_some_none() {
    let s: Sample = serde_json::from_str(r#"{"note":null}"#).unwrap();
    assert_eq!(s.note, Some(None));
  }

  #[test]
  fn value_is_some_some() {
    let s: Sample = serde_json::from_str(r#"{"note":"hi"}"#).unwrap();
    assert_eq!(s.note, Some(Some("hi".to_owned())));
  }

  #[test]
  fn blank_required_text_is_rejected() {
    assert!(matches!(check_required("name", "  ", 10), Err(Error::Validation(_))));
    assert!(matches!(check_required("name", "abcdefghijk", 10), Err(Error::Validation(_))));
    assert!(check_required("name", "ok", 10).is_ok());
  }
}
