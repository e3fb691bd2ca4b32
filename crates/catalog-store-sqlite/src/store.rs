//! [`SqliteStore`]: the SQLite implementation of the catalog store traits.

use std::{collections::HashMap, path::Path};

use catalog_core::{
  EntityKind,
  category::{Category, CategoryFilter, CategoryPatch, NewCategory},
  hierarchy::CategoryTree,
  item::{Item, ItemFilter, ItemPatch, NewItem},
  product::{NewProduct, Product, ProductFilter, ProductPatch},
  review::{NewReview, Review, ReviewFilter, ReviewPatch},
  store::{CatalogStore, Listing, Page, Repository, next_timestamp},
  user::{Credentials, NewUser, User},
};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, Row, Transaction, types::Value};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    CATEGORY_COLUMNS, ITEM_COLUMNS, PRODUCT_COLUMNS, REVIEW_COLUMNS, USER_COLUMNS,
    category_from_row, credentials_from_row, encode_decimal, encode_dt, encode_uuid,
    item_from_row, product_from_row, review_from_row, user_from_row,
  },
  schema::SCHEMA,
};

/// The domain outcome of one transaction. An `Err` here rolls the
/// transaction back; database faults travel in the outer `rusqlite::Result`.
type Outcome<T> = std::result::Result<T, catalog_core::Error>;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A catalog store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, as used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside one transaction on the connection thread.
  ///
  /// The transaction commits only if `f` returns `Ok(Ok(_))`.
  async fn transact<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> rusqlite::Result<Outcome<T>> + Send + 'static,
  {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome = f(&tx)?;
        if outcome.is_ok() {
          tx.commit()?;
        }
        Ok(outcome)
      })
      .await?;
    Ok(outcome?)
  }
}

// ─── Query helpers ───────────────────────────────────────────────────────────

fn fetch_one<T>(
  conn: &Connection,
  columns: &str,
  table: &str,
  id: Uuid,
  decode: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Option<T>> {
  conn
    .query_row(
      &format!("SELECT {columns} FROM {table} WHERE id = ?1"),
      rusqlite::params![encode_uuid(id)],
      decode,
    )
    .optional()
}

fn exists(conn: &Connection, table: &str, id: Uuid) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        &format!("SELECT 1 FROM {table} WHERE id = ?1"),
        rusqlite::params![encode_uuid(id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn count_where(conn: &Connection, table: &str, column: &str, id: Uuid) -> rusqlite::Result<u64> {
  let count: i64 = conn.query_row(
    &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"),
    rusqlite::params![encode_uuid(id)],
    |r| r.get(0),
  )?;
  Ok(count as u64)
}

/// One page of `table` rows matching `condition` (which may refer to `?1`,
/// `?2`, ... bound to `args` in order), in insertion order, plus the total
/// match count.
fn select_page<T>(
  conn: &Connection,
  columns: &str,
  table: &str,
  condition: &str,
  mut args: Vec<Value>,
  page: Page,
  decode: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Listing<T>> {
  let count: i64 = conn.query_row(
    &format!("SELECT COUNT(*) FROM {table} WHERE {condition}"),
    rusqlite::params_from_iter(&args),
    |r| r.get(0),
  )?;

  let limit_at = args.len() + 1;
  let offset_at = args.len() + 2;
  args.push(Value::Integer(i64::try_from(page.limit).unwrap_or(i64::MAX)));
  args.push(Value::Integer(i64::try_from(page.offset).unwrap_or(i64::MAX)));

  let mut stmt = conn.prepare(&format!(
    "SELECT {columns} FROM {table} WHERE {condition} \
     ORDER BY rowid LIMIT ?{limit_at} OFFSET ?{offset_at}"
  ))?;
  let data = stmt
    .query_map(rusqlite::params_from_iter(&args), decode)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Listing { data, count: count as u64 })
}

fn optional_id(id: Option<Uuid>) -> Value {
  id.map_or(Value::Null, |id| Value::Text(encode_uuid(id)))
}

fn all_categories(conn: &Connection) -> rusqlite::Result<Vec<Category>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY rowid"
  ))?;
  let rows = stmt
    .query_map([], category_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn write_category(conn: &Connection, category: &Category) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE categories SET name = ?2, parent_id = ?3 WHERE id = ?1",
    rusqlite::params![
      encode_uuid(category.id),
      category.name,
      category.parent_id.map(encode_uuid),
    ],
  )?;
  Ok(())
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  type Error = crate::Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      id:           Uuid::new_v4(),
      email:        input.email,
      full_name:    input.full_name,
      is_active:    input.is_active,
      is_superuser: input.is_superuser,
      created_at:   Utc::now(),
    };

    let row = user.clone();
    self
      .transact(move |tx| {
        tx.execute(
          "INSERT INTO users (
             id, email, full_name, password_hash, is_active, is_superuser, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            encode_uuid(row.id),
            row.email,
            row.full_name,
            input.password_hash,
            row.is_active,
            row.is_superuser,
            encode_dt(row.created_at),
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self
      .transact(move |tx| Ok(Ok(fetch_one(tx, USER_COLUMNS, "users", id, user_from_row)?)))
      .await
  }

  async fn find_credentials(&self, email: String) -> Result<Option<Credentials>> {
    self
      .transact(move |tx| {
        let found = tx
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            rusqlite::params![email],
            credentials_from_row,
          )
          .optional()?;
        Ok(Ok(found))
      })
      .await
  }

  // ── Category hierarchy ────────────────────────────────────────────────────

  async fn set_parent(&self, category_id: Uuid, parent_id: Option<Uuid>) -> Result<Category> {
    self
      .transact(move |tx| {
        let categories = all_categories(tx)?;
        let mut tree: CategoryTree = categories.iter().collect();
        if let Err(e) = tree.set_parent(category_id, parent_id) {
          return Ok(Err(e));
        }

        let Some(mut category) = categories.into_iter().find(|c| c.id == category_id) else {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Category, category_id)));
        };
        category.parent_id = parent_id;
        write_category(tx, &category)?;
        Ok(Ok(category))
      })
      .await
  }

  async fn ancestors_of(&self, category_id: Uuid) -> Result<Vec<Category>> {
    self
      .transact(move |tx| {
        let categories = all_categories(tx)?;
        let tree: CategoryTree = categories.iter().collect();
        let ids = match tree.ancestors(category_id) {
          Ok(ids) => ids,
          Err(e) => return Ok(Err(e)),
        };

        let mut by_id: HashMap<Uuid, Category> =
          categories.into_iter().map(|c| (c.id, c)).collect();
        Ok(Ok(ids.into_iter().filter_map(|id| by_id.remove(&id)).collect()))
      })
      .await
  }
}

// ─── Repository<Category> ────────────────────────────────────────────────────

impl Repository<Category> for SqliteStore {
  async fn get(&self, id: Uuid) -> Result<Option<Category>> {
    self
      .transact(move |tx| {
        Ok(Ok(fetch_one(tx, CATEGORY_COLUMNS, "categories", id, category_from_row)?))
      })
      .await
  }

  async fn list(&self, filter: CategoryFilter, page: Page) -> Result<Listing<Category>> {
    self
      .transact(move |tx| {
        Ok(Ok(select_page(
          tx,
          CATEGORY_COLUMNS,
          "categories",
          "(?1 = 0 OR parent_id IS NULL) AND (?2 IS NULL OR parent_id = ?2)",
          vec![Value::Integer(i64::from(filter.roots_only)), optional_id(filter.parent_id)],
          page,
          category_from_row,
        )?))
      })
      .await
  }

  async fn create(&self, input: NewCategory) -> Result<Category> {
    let category = Category {
      id:        Uuid::new_v4(),
      name:      input.name,
      parent_id: input.parent_id,
    };

    let row = category.clone();
    self
      .transact(move |tx| {
        if let Some(parent) = row.parent_id
          && !exists(tx, "categories", parent)?
        {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Category, parent)));
        }
        tx.execute(
          "INSERT INTO categories (id, name, parent_id) VALUES (?1, ?2, ?3)",
          rusqlite::params![encode_uuid(row.id), row.name, row.parent_id.map(encode_uuid)],
        )?;
        Ok(Ok(()))
      })
      .await?;

    Ok(category)
  }

  async fn update(&self, id: Uuid, patch: CategoryPatch) -> Result<Category> {
    self
      .transact(move |tx| {
        let Some(mut category) =
          fetch_one(tx, CATEGORY_COLUMNS, "categories", id, category_from_row)?
        else {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Category, id)));
        };

        if let Some(parent) = patch.parent_id {
          let tree: CategoryTree = all_categories(tx)?.iter().collect();
          if let Err(e) = tree.check_parent(id, parent) {
            return Ok(Err(e));
          }
        }

        category.apply(patch);
        write_category(tx, &category)?;
        Ok(Ok(category))
      })
      .await
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        if !exists(tx, "categories", id)? {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Category, id)));
        }
        if count_where(tx, "categories", "parent_id", id)? > 0 {
          return Ok(Err(catalog_core::Error::Conflict(
            "category still has subcategories".to_owned(),
          )));
        }
        if count_where(tx, "products", "category_id", id)? > 0 {
          return Ok(Err(catalog_core::Error::Conflict(
            "category still has products".to_owned(),
          )));
        }
        tx.execute("DELETE FROM categories WHERE id = ?1", rusqlite::params![encode_uuid(id)])?;
        Ok(Ok(()))
      })
      .await
  }
}

// ─── Repository<Product> ─────────────────────────────────────────────────────

fn write_product(conn: &Connection, p: &Product) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE products SET
       name = ?2, description = ?3, price = ?4, quantity = ?5, in_stock = ?6,
       image_url = ?7, is_active = ?8, category_id = ?9, updated_at = ?10
     WHERE id = ?1",
    rusqlite::params![
      encode_uuid(p.id),
      p.name,
      p.description,
      encode_decimal(p.price),
      p.quantity,
      p.in_stock,
      p.image_url,
      p.is_active,
      encode_uuid(p.category_id),
      encode_dt(p.updated_at),
    ],
  )?;
  Ok(())
}

impl Repository<Product> for SqliteStore {
  async fn get(&self, id: Uuid) -> Result<Option<Product>> {
    self
      .transact(move |tx| {
        Ok(Ok(fetch_one(tx, PRODUCT_COLUMNS, "products", id, product_from_row)?))
      })
      .await
  }

  async fn list(&self, filter: ProductFilter, page: Page) -> Result<Listing<Product>> {
    self
      .transact(move |tx| {
        Ok(Ok(select_page(
          tx,
          PRODUCT_COLUMNS,
          "products",
          "(?1 IS NULL OR category_id = ?1)",
          vec![optional_id(filter.category_id)],
          page,
          product_from_row,
        )?))
      })
      .await
  }

  async fn create(&self, input: NewProduct) -> Result<Product> {
    let now = Utc::now();
    let product = Product {
      id:          Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      sku:         input.sku,
      price:       input.price,
      quantity:    input.quantity,
      in_stock:    input.in_stock,
      image_url:   input.image_url,
      is_active:   input.is_active,
      category_id: input.category_id,
      created_at:  now,
      updated_at:  now,
    };

    let p = product.clone();
    self
      .transact(move |tx| {
        if !exists(tx, "categories", p.category_id)? {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Category, p.category_id)));
        }
        tx.execute(
          "INSERT INTO products (
             id, name, description, sku, price, quantity, in_stock,
             image_url, is_active, category_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            encode_uuid(p.id),
            p.name,
            p.description,
            p.sku,
            encode_decimal(p.price),
            p.quantity,
            p.in_stock,
            p.image_url,
            p.is_active,
            encode_uuid(p.category_id),
            encode_dt(p.created_at),
            encode_dt(p.updated_at),
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;

    Ok(product)
  }

  async fn update(&self, id: Uuid, patch: ProductPatch) -> Result<Product> {
    self
      .transact(move |tx| {
        let Some(mut product) = fetch_one(tx, PRODUCT_COLUMNS, "products", id, product_from_row)?
        else {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Product, id)));
        };

        if let Some(category_id) = patch.category_id
          && !exists(tx, "categories", category_id)?
        {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Category, category_id)));
        }

        product.apply(patch);
        product.updated_at = next_timestamp(product.updated_at);
        write_product(tx, &product)?;
        Ok(Ok(product))
      })
      .await
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        // Reviews go with the product (ON DELETE CASCADE).
        let deleted =
          tx.execute("DELETE FROM products WHERE id = ?1", rusqlite::params![encode_uuid(id)])?;
        if deleted == 0 {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Product, id)));
        }
        Ok(Ok(()))
      })
      .await
  }
}

// ─── Repository<Review> ──────────────────────────────────────────────────────

impl Repository<Review> for SqliteStore {
  async fn get(&self, id: Uuid) -> Result<Option<Review>> {
    self
      .transact(move |tx| Ok(Ok(fetch_one(tx, REVIEW_COLUMNS, "reviews", id, review_from_row)?)))
      .await
  }

  async fn list(&self, filter: ReviewFilter, page: Page) -> Result<Listing<Review>> {
    self
      .transact(move |tx| {
        Ok(Ok(select_page(
          tx,
          REVIEW_COLUMNS,
          "reviews",
          "(?1 IS NULL OR product_id = ?1)",
          vec![optional_id(filter.product_id)],
          page,
          review_from_row,
        )?))
      })
      .await
  }

  async fn create(&self, input: NewReview) -> Result<Review> {
    let now = Utc::now();
    let review = Review {
      id:          Uuid::new_v4(),
      full_name:   input.full_name,
      description: input.description,
      rating:      input.rating,
      product_id:  input.product_id,
      user_id:     input.user_id,
      created_at:  now,
      updated_at:  now,
    };

    let r = review.clone();
    self
      .transact(move |tx| {
        if !exists(tx, "products", r.product_id)? {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Product, r.product_id)));
        }
        tx.execute(
          "INSERT INTO reviews (
             id, full_name, description, rating, product_id, user_id, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            encode_uuid(r.id),
            r.full_name,
            r.description,
            r.rating,
            encode_uuid(r.product_id),
            r.user_id.map(encode_uuid),
            encode_dt(r.created_at),
            encode_dt(r.updated_at),
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;

    Ok(review)
  }

  async fn update(&self, id: Uuid, patch: ReviewPatch) -> Result<Review> {
    self
      .transact(move |tx| {
        let Some(mut review) = fetch_one(tx, REVIEW_COLUMNS, "reviews", id, review_from_row)? else {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Review, id)));
        };

        review.apply(patch);
        review.updated_at = next_timestamp(review.updated_at);
        tx.execute(
          "UPDATE reviews SET full_name = ?2, description = ?3, rating = ?4, updated_at = ?5
           WHERE id = ?1",
          rusqlite::params![
            encode_uuid(review.id),
            review.full_name,
            review.description,
            review.rating,
            encode_dt(review.updated_at),
          ],
        )?;
        Ok(Ok(review))
      })
      .await
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        let deleted =
          tx.execute("DELETE FROM reviews WHERE id = ?1", rusqlite::params![encode_uuid(id)])?;
        if deleted == 0 {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Review, id)));
        }
        Ok(Ok(()))
      })
      .await
  }
}

// ─── Repository<Item> ────────────────────────────────────────────────────────

impl Repository<Item> for SqliteStore {
  async fn get(&self, id: Uuid) -> Result<Option<Item>> {
    self
      .transact(move |tx| Ok(Ok(fetch_one(tx, ITEM_COLUMNS, "items", id, item_from_row)?)))
      .await
  }

  async fn list(&self, filter: ItemFilter, page: Page) -> Result<Listing<Item>> {
    self
      .transact(move |tx| {
        Ok(Ok(select_page(
          tx,
          ITEM_COLUMNS,
          "items",
          "(?1 IS NULL OR owner_id = ?1)",
          vec![optional_id(filter.owner_id)],
          page,
          item_from_row,
        )?))
      })
      .await
  }

  async fn create(&self, input: NewItem) -> Result<Item> {
    let item = Item {
      id:          Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      owner_id:    input.owner_id,
    };

    let row = item.clone();
    self
      .transact(move |tx| {
        if !exists(tx, "users", row.owner_id)? {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::User, row.owner_id)));
        }
        tx.execute(
          "INSERT INTO items (id, title, description, owner_id) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            encode_uuid(row.id),
            row.title,
            row.description,
            encode_uuid(row.owner_id),
          ],
        )?;
        Ok(Ok(()))
      })
      .await?;

    Ok(item)
  }

  async fn update(&self, id: Uuid, patch: ItemPatch) -> Result<Item> {
    self
      .transact(move |tx| {
        let Some(mut item) = fetch_one(tx, ITEM_COLUMNS, "items", id, item_from_row)? else {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Item, id)));
        };

        item.apply(patch);
        tx.execute(
          "UPDATE items SET title = ?2, description = ?3 WHERE id = ?1",
          rusqlite::params![encode_uuid(item.id), item.title, item.description],
        )?;
        Ok(Ok(item))
      })
      .await
  }

  async fn delete(&self, id: Uuid) -> Result<()> {
    self
      .transact(move |tx| {
        let deleted =
          tx.execute("DELETE FROM items WHERE id = ?1", rusqlite::params![encode_uuid(id)])?;
        if deleted == 0 {
          return Ok(Err(catalog_core::Error::not_found(EntityKind::Item, id)));
        }
        Ok(Ok(()))
      })
      .await
  }
}
