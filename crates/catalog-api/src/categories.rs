//! Category hierarchy endpoints, on top of the generic CRUD routes.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/categories/{id}/subcategories` | Direct children, paged like any list |
//! | `POST` | `/categories/{id}/subcategories` | Body: `{"name": …}`; creates a child |
//! | `PUT`  | `/categories/{id}/parent` | Body: `{"parent_id": <id>\|null}`; 409 on a cycle |
//! | `GET`  | `/categories/{id}/ancestors` | Nearest first, `{data,count}` |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::JsonRejection},
};
use catalog_core::{
  EntityKind, Result as CoreResult,
  category::{Category, CategoryFilter, NAME_MAX, NewCategory},
  payload::{Validate, check_required},
  policy::{Action, Target},
  store::{CatalogStore, Listing, Repository},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  AppState,
  auth::Authenticated,
  crud::{PageParams, allow, fetch},
  error::ApiError,
};

/// `GET /categories/{id}/subcategories?skip&limit`
pub async fn subcategories<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<PageParams>,
) -> Result<Json<Listing<Category>>, ApiError>
where
  S: Repository<Category> + Clone + 'static,
{
  fetch::<S, Category>(&state.store, id).await?;

  let filter = CategoryFilter { parent_id: Some(id), ..CategoryFilter::default() };
  let page = state.config.page(params.skip, params.limit);
  let children = Repository::<Category>::list(&*state.store, filter, page)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(children))
}

#[derive(Debug, Deserialize)]
pub struct SubcategoryBody {
  pub name: String,
}

impl Validate for SubcategoryBody {
  fn validate(&self) -> CoreResult<()> {
    check_required("name", &self.name, NAME_MAX)
  }
}

/// `POST /categories/{id}/subcategories`
pub async fn create_subcategory<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(id): Path<Uuid>,
  body: Result<Json<SubcategoryBody>, JsonRejection>,
) -> Result<Json<Category>, ApiError>
where
  S: Repository<Category> + Clone + 'static,
{
  let actor = auth.actor();
  fetch::<S, Category>(&state.store, id).await?;
  allow(&actor, Action::Create, Target::new(EntityKind::Category))?;

  let Json(body) = body?;
  body.validate()?;

  let input = NewCategory { name: body.name, parent_id: Some(id) };
  let created = Repository::<Category>::create(&*state.store, input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = %created.id, parent = %id, user = %actor.id, "created subcategory");
  Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct ParentBody {
  /// `null` (or absent) detaches the category into a root.
  #[serde(default)]
  pub parent_id: Option<Uuid>,
}

/// `PUT /categories/{id}/parent`
pub async fn set_parent<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Path(id): Path<Uuid>,
  body: Result<Json<ParentBody>, JsonRejection>,
) -> Result<Json<Category>, ApiError>
where
  S: Repository<Category> + Clone + 'static,
{
  let existing = fetch::<S, Category>(&state.store, id).await?;
  allow(&auth.actor(), Action::Update, Target::of(&existing))?;

  let Json(body) = body?;
  let moved = state
    .store
    .set_parent(id, body.parent_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(moved))
}

/// `GET /categories/{id}/ancestors`
pub async fn ancestors<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Listing<Category>>, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let data = state.store.ancestors_of(id).await.map_err(ApiError::store)?;
  let count = data.len() as u64;
  Ok(Json(Listing { data, count }))
}
