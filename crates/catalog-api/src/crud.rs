//! Generic handlers shared by every [`Resource`] kind.
//!
//! | Method   | Path               | Notes |
//! |----------|--------------------|-------|
//! | `GET`    | `/{kind}/`         | `?skip&limit` plus the kind's filter; `{data,count}` |
//! | `POST`   | `/{kind}/`         | Body: `R::New`; returns the created entity |
//! | `GET`    | `/{kind}/{id}`     | 404 if not found |
//! | `PATCH`  | `/{kind}/{id}`     | Body: `R::Patch`; absent fields are unchanged |
//! | `PUT`    | `/products/{id}`   | Same as `PATCH`, kept for product editors |
//! | `DELETE` | `/{kind}/{id}`     | `{"message": "<Kind> deleted successfully"}` |
//!
//! Every write runs: authenticate, fetch, authorize, validate, then store. The
//! body is only inspected once the caller is known to be allowed, so a
//! malformed request from a stranger is still refused as forbidden.

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
};
use catalog_core::{
  Error, Resource,
  payload::Validate as _,
  policy::{Action, Target, authorize},
  store::{Listing, Repository},
  user::CurrentUser,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  pub skip:  Option<u64>,
  pub limit: Option<u64>,
}

/// Response body of a successful delete.
#[derive(Debug, Serialize)]
pub struct Message {
  pub message: String,
}

/// Run the policy, logging refusals.
pub(crate) fn allow(actor: &CurrentUser, action: Action, target: Target) -> Result<(), ApiError> {
  authorize(Some(actor), action, target).map_err(|e| {
    tracing::debug!(user = %actor.id, ?action, kind = %target.kind, "request refused");
    e.into()
  })
}

/// Load `id` or fail with not-found.
pub(crate) async fn fetch<S, R>(store: &S, id: Uuid) -> Result<R, ApiError>
where
  S: Repository<R>,
  R: Resource,
{
  Repository::<R>::get(store, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Error::not_found(R::KIND, id).into())
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /{kind}/?skip&limit[&filter…]`
pub async fn list<S, R>(
  State(state): State<AppState<S>>,
  Query(params): Query<PageParams>,
  Query(filter): Query<R::Filter>,
) -> Result<Json<Listing<R>>, ApiError>
where
  S: Repository<R> + Clone + 'static,
  R: Resource,
{
  let page = state.config.page(params.skip, params.limit);
  let listing = Repository::<R>::list(&*state.store, filter, page)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(listing))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /{kind}/{id}`
pub async fn get_one<S, R>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<R>, ApiError>
where
  S: Repository<R> + Clone + 'static,
  R: Resource,
{
  Ok(Json(fetch::<S, R>(&state.store, id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /{kind}/`
pub async fn create<S, R>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  body: Result<Json<R::New>, JsonRejection>,
) -> Result<Json<R>, ApiError>
where
  S: Repository<R> + Clone + 'static,
  R: Resource,
{
  let actor = auth.actor();
  allow(&actor, Action::Create, Target::new(R::KIND))?;

  let Json(mut input) = body?;
  input.validate()?;
  R::attribute(&mut input, &actor);

  let created = Repository::<R>::create(&*state.store, input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(kind = %R::KIND, id = %created.id(), user = %actor.id, "created");
  Ok(Json(created))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /{kind}/{id}`, and `PUT /products/{id}`
pub async fn update<S, R>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(id): Path<Uuid>,
  body: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<R>, ApiError>
where
  S: Repository<R> + Clone + 'static,
  R: Resource,
{
  let existing = fetch::<S, R>(&state.store, id).await?;
  allow(&auth.actor(), Action::Update, Target::of(&existing))?;

  let Json(patch) = body?;
  patch.validate()?;

  let updated = Repository::<R>::update(&*state.store, id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(updated))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /{kind}/{id}`
pub async fn delete<S, R>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<Json<Message>, ApiError>
where
  S: Repository<R> + Clone + 'static,
  R: Resource,
{
  let actor = auth.actor();
  let existing = fetch::<S, R>(&state.store, id).await?;
  allow(&actor, Action::Delete, Target::of(&existing))?;

  Repository::<R>::delete(&*state.store, id)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(kind = %R::KIND, %id, user = %actor.id, "deleted");
  Ok(Json(Message { message: format!("{} deleted successfully", R::KIND) }))
}
