//! JSON REST API for the catalog.
//!
//! Exposes an axum [`Router`] backed by any store implementing
//! [`Repository`] for every served resource kind.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = catalog_api::router(AppState::new(store, config));
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod categories;
pub mod config;
pub mod crud;
pub mod error;
pub mod users;


use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{get, put},
};
use catalog_core::{
  Resource,
  category::Category,
  item::Item,
  product::Product,
  review::Review,
  store::{CatalogStore, Repository},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CatalogStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S: CatalogStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self { store: Arc::new(store), config: Arc::new(config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the catalog API router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: Repository<Category>
    + Repository<Product>
    + Repository<Review>
    + Repository<Item>
    + Clone
    + 'static,
{
  Router::new()
    .route("/health", get(health))
    .route("/users/me", get(users::me))
    .merge(resource_routes::<S, Category>("/categories"))
    .route(
      "/categories/{id}/subcategories",
      get(categories::subcategories::<S>).post(categories::create_subcategory::<S>),
    )
    .route("/categories/{id}/parent", put(categories::set_parent::<S>))
    .route("/categories/{id}/ancestors", get(categories::ancestors::<S>))
    .merge(resource_routes::<S, Product>("/products"))
    .route("/products/{id}", put(crud::update::<S, Product>))
    .merge(resource_routes::<S, Review>("/reviews"))
    .merge(resource_routes::<S, Item>("/items"))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// The five generic CRUD routes for one resource kind, with the collection
/// reachable both with and without a trailing slash.
fn resource_routes<S, R>(collection: &str) -> Router<AppState<S>>
where
  S: Repository<R> + Clone + 'static,
  R: Resource,
{
  let list_or_create = get(crud::list::<S, R>).post(crud::create::<S, R>);
  Router::new()
    .route(&format!("{collection}/"), list_or_create.clone())
    .route(collection, list_or_create)
    .route(
      &format!("{collection}/{{id}}"),
      get(crud::get_one::<S, R>)
        .patch(crud::update::<S, R>)
        .delete(crud::delete::<S, R>),
    )
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
