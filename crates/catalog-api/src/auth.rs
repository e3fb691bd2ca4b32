//! HTTP Basic-auth extractor resolving the caller to a stored user.
//!
//! Credentials are `email:password`; the password is checked against the
//! user's argon2 PHC string.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use catalog_core::{
  Error,
  store::CatalogStore,
  user::{CurrentUser, User},
};

use crate::{AppState, error::ApiError};

/// Present in a handler means the request carried valid credentials for an
/// active user.
#[derive(Debug, Clone)]
pub struct Authenticated(pub User);

impl Authenticated {
  pub fn actor(&self) -> CurrentUser { CurrentUser::from(&self.0) }
}

/// Pull `(email, password)` out of an `Authorization: Basic …` header.
pub fn basic_credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthenticated)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthenticated)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthenticated)?;
  let creds = String::from_utf8(decoded).map_err(|_| Error::Unauthenticated)?;

  let (email, password) = creds.split_once(':').ok_or(Error::Unauthenticated)?;
  Ok((email.to_owned(), password.to_owned()))
}

/// Check `password` against a stored PHC string. The hash carries its own
/// parameters, so the default verifier handles any cost setting.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), Error> {
  let parsed_hash = PasswordHash::new(password_hash).map_err(|_| Error::Unauthenticated)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthenticated)
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: CatalogStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (email, password) = basic_credentials(&parts.headers)?;

    let credentials = state
      .store
      .find_credentials(email)
      .await
      .map_err(ApiError::store)?
      .ok_or(Error::Unauthenticated)?;

    verify_password(&password, &credentials.password_hash)?;

    if !credentials.user.is_active {
      tracing::debug!(user = %credentials.user.id, "inactive user refused");
      return Err(Error::Forbidden("inactive user".to_owned()).into());
    }

    Ok(Authenticated(credentials.user))
  }
}
