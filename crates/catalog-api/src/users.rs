//! `GET /users/me`: the authenticated caller's own record.

use axum::Json;
use catalog_core::user::User;

use crate::auth::Authenticated;

pub async fn me(Authenticated(user): Authenticated) -> Json<User> { Json(user) }
