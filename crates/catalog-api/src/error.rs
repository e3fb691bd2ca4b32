//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use catalog_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Catalog(#[from] Error),

  /// The request body could not be read as the expected JSON payload.
  #[error(transparent)]
  Body(#[from] JsonRejection),
}

impl ApiError {
  /// Lift a store backend's error into the catalog taxonomy.
  pub fn store<E: Into<Error>>(err: E) -> Self { Self::Catalog(err.into()) }
}

fn detail(status: StatusCode, message: String) -> Response {
  (status, Json(json!({ "detail": message }))).into_response()
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let err = match self {
      ApiError::Body(rejection) => return detail(rejection.status(), rejection.body_text()),
      ApiError::Catalog(err) => err,
    };

    let status = match &err {
      Error::NotFound { .. } => StatusCode::NOT_FOUND,
      Error::Forbidden(_) => StatusCode::FORBIDDEN,
      Error::Unauthenticated => StatusCode::UNAUTHORIZED,
      Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
      Error::Conflict(_) | Error::Cycle { .. } => StatusCode::CONFLICT,
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned());
      }
    };

    let mut res = detail(status, err.to_string());
    if status == StatusCode::UNAUTHORIZED {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"catalog\""),
      );
    }
    res
  }
}
