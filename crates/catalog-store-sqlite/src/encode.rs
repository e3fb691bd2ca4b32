//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Prices are stored as decimal strings so no
//! precision is lost to floating point.

use std::str::FromStr as _;

use catalog_core::{
  category::Category,
  item::Item,
  product::Product,
  review::Review,
  user::{Credentials, User},
};
use chrono::{DateTime, Utc};
use rusqlite::{Row, types::Type};
use rust_decimal::Decimal;
use uuid::Uuid;

// ─── Column lists ────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "id, email, full_name, is_active, is_superuser, created_at, password_hash";

pub const CATEGORY_COLUMNS: &str = "id, name, parent_id";

pub const PRODUCT_COLUMNS: &str = "id, name, description, sku, price, quantity, in_stock, \
                                   image_url, is_active, category_id, created_at, updated_at";

pub const REVIEW_COLUMNS: &str =
  "id, full_name, description, rating, product_id, user_id, created_at, updated_at";

pub const ITEM_COLUMNS: &str = "id, title, description, owner_id";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid, uuid::Error> { Uuid::parse_str(s) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
  DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

// ─── Decimal ──────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal, rust_decimal::Error> { Decimal::from_str(s) }

// ─── Column readers ──────────────────────────────────────────────────────────

fn conversion_failure<E>(idx: usize, err: E) -> rusqlite::Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
  let raw: String = row.get(idx)?;
  decode_uuid(&raw).map_err(|e| conversion_failure(idx, e))
}

fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
  let raw: Option<String> = row.get(idx)?;
  raw
    .as_deref()
    .map(decode_uuid)
    .transpose()
    .map_err(|e| conversion_failure(idx, e))
}

fn dt_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  let raw: String = row.get(idx)?;
  decode_dt(&raw).map_err(|e| conversion_failure(idx, e))
}

fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
  let raw: String = row.get(idx)?;
  decode_decimal(&raw).map_err(|e| conversion_failure(idx, e))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Decode a row selected with [`USER_COLUMNS`].
pub fn credentials_from_row(row: &Row<'_>) -> rusqlite::Result<Credentials> {
  Ok(Credentials {
    user:          User {
      id:           uuid_at(row, 0)?,
      email:        row.get(1)?,
      full_name:    row.get(2)?,
      is_active:    row.get(3)?,
      is_superuser: row.get(4)?,
      created_at:   dt_at(row, 5)?,
    },
    password_hash: row.get(6)?,
  })
}

pub fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
  credentials_from_row(row).map(|c| c.user)
}

/// Decode a row selected with [`CATEGORY_COLUMNS`].
pub fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
  Ok(Category {
    id:        uuid_at(row, 0)?,
    name:      row.get(1)?,
    parent_id: opt_uuid_at(row, 2)?,
  })
}

/// Decode a row selected with [`PRODUCT_COLUMNS`].
pub fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
  Ok(Product {
    id:          uuid_at(row, 0)?,
    name:        row.get(1)?,
    description: row.get(2)?,
    sku:         row.get(3)?,
    price:       decimal_at(row, 4)?,
    quantity:    row.get(5)?,
    in_stock:    row.get(6)?,
    image_url:   row.get(7)?,
    is_active:   row.get(8)?,
    category_id: uuid_at(row, 9)?,
    created_at:  dt_at(row, 10)?,
    updated_at:  dt_at(row, 11)?,
  })
}

/// Decode a row selected with [`REVIEW_COLUMNS`].
pub fn review_from_row(row: &Row<'_>) -> rusqlite::Result<Review> {
  Ok(Review {
    id:          uuid_at(row, 0)?,
    full_name:   row.get(1)?,
    description: row.get(2)?,
    rating:      row.get(3)?,
    product_id:  uuid_at(row, 4)?,
    user_id:     opt_uuid_at(row, 5)?,
    created_at:  dt_at(row, 6)?,
    updated_at:  dt_at(row, 7)?,
  })
}

/// Decode a row selected with [`ITEM_COLUMNS`].
pub fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
  Ok(Item {
    id:          uuid_at(row, 0)?,
    title:       row.get(1)?,
    description: row.get(2)?,
    owner_id:    uuid_at(row, 3)?,
  })
}
