//! Products: sellable items, each filed under exactly one category.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  EntityKind, Error, Resource, Result,
  payload::{Validate, check_optional, check_required, nullable},
};

pub const NAME_MAX: usize = 150;
pub const DESCRIPTION_MAX: usize = 1000;
pub const SKU_MAX: usize = 50;
pub const IMAGE_URL_MAX: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
  pub id:          Uuid,
  pub name:        String,
  pub description: Option<String>,
  /// Globally unique; fixed at creation.
  pub sku:         String,
  pub price:       Decimal,
  pub quantity:    i64,
  pub in_stock:    bool,
  pub image_url:   Option<String>,
  pub is_active:   bool,
  pub category_id: Uuid,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Product {
  /// Merge the supplied fields. `updated_at` is left to the store.
  pub fn apply(&mut self, patch: ProductPatch) {
    if let Some(name) = patch.name {
      self.name = name;
    }
    if let Some(description) = patch.description {
      self.description = description;
    }
    if let Some(price) = patch.price {
      self.price = price;
    }
    if let Some(quantity) = patch.quantity {
      self.quantity = quantity;
    }
    if let Some(in_stock) = patch.in_stock {
      self.in_stock = in_stock;
    }
    if let Some(image_url) = patch.image_url {
      self.image_url = image_url;
    }
    if let Some(is_active) = patch.is_active {
      self.is_active = is_active;
    }
    if let Some(category_id) = patch.category_id {
      self.category_id = category_id;
    }
  }
}

fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub name:        String,
  pub description: Option<String>,
  pub sku:         String,
  pub price:       Decimal,
  #[serde(default)]
  pub quantity:    i64,
  #[serde(default = "default_true")]
  pub in_stock:    bool,
  pub image_url:   Option<String>,
  #[serde(default = "default_true")]
  pub is_active:   bool,
  pub category_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
  pub name:        Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub description: Option<Option<String>>,
  pub price:       Option<Decimal>,
  pub quantity:    Option<i64>,
  pub in_stock:    Option<bool>,
  #[serde(default, deserialize_with = "nullable")]
  pub image_url:   Option<Option<String>>,
  pub is_active:   Option<bool>,
  pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
  pub category_id: Option<Uuid>,
}

fn check_price(price: Decimal) -> Result<()> {
  if price < Decimal::ZERO {
    return Err(Error::validation("price must not be negative"));
  }
  Ok(())
}

fn check_quantity(quantity: i64) -> Result<()> {
  if quantity < 0 {
    return Err(Error::validation("quantity must not be negative"));
  }
  Ok(())
}

impl Validate for NewProduct {
  fn validate(&self) -> Result<()> {
    check_required("name", &self.name, NAME_MAX)?;
    check_optional("description", self.description.as_deref(), DESCRIPTION_MAX)?;
    check_required("sku", &self.sku, SKU_MAX)?;
    check_optional("image_url", self.image_url.as_deref(), IMAGE_URL_MAX)?;
    check_price(self.price)?;
    check_quantity(self.quantity)
  }
}

impl Validate for ProductPatch {
  fn validate(&self) -> Result<()> {
    if let Some(name) = &self.name {
      check_required("name", name, NAME_MAX)?;
    }
    if let Some(description) = &self.description {
      check_optional("description", description.as_deref(), DESCRIPTION_MAX)?;
    }
    if let Some(image_url) = &self.image_url {
      check_optional("image_url", image_url.as_deref(), IMAGE_URL_MAX)?;
    }
    if let Some(price) = self.price {
      check_price(price)?;
    }
    if let Some(quantity) = self.quantity {
      check_quantity(quantity)?;
    }
    Ok(())
  }
}

impl Resource for Product {
  const KIND: EntityKind = EntityKind::Product;

  type New = NewProduct;
  type Patch = ProductPatch;
  type Filter = ProductFilter;

  fn id(&self) -> Uuid { self.id }
}
