//! Integration tests for `SqliteStore` against an in-memory database.

use catalog_core::{
  Error as CoreError,
  category::{Category, CategoryFilter, CategoryPatch, NewCategory},
  item::{Item, ItemFilter, ItemPatch, NewItem},
  product::{NewProduct, Product, ProductFilter, ProductPatch},
  review::{NewReview, Review, ReviewFilter, ReviewPatch},
  store::{CatalogStore, Listing, Page, Repository},
  user::NewUser,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn core(err: crate::Error) -> CoreError { err.into() }

// ─── Fixtures ────────────────────────────────────────────────────────────────

async fn category(s: &SqliteStore, name: &str, parent_id: Option<Uuid>) -> Category {
  Repository::<Category>::create(s, NewCategory { name: name.into(), parent_id })
    .await
    .unwrap()
}

fn new_product(sku: &str, category_id: Uuid) -> NewProduct {
  NewProduct {
    name: format!("Product {sku}"),
    description: None,
    sku: sku.into(),
    price: Decimal::new(1999, 2),
    quantity: 5,
    in_stock: true,
    image_url: None,
    is_active: true,
    category_id,
  }
}

async fn children(s: &SqliteStore, parent: Uuid, page: Page) -> Listing<Category> {
  let filter = CategoryFilter { parent_id: Some(parent), ..CategoryFilter::default() };
  Repository::<Category>::list(s, filter, page).await.unwrap()
}

async fn product(s: &SqliteStore, sku: &str, category_id: Uuid) -> Product {
  Repository::<Product>::create(s, new_product(sku, category_id))
    .await
    .unwrap()
}

async fn user(s: &SqliteStore, email: &str) -> Uuid {
  s.create_user(NewUser {
    email:         email.into(),
    full_name:     None,
    password_hash: "$argon2id$placeholder".into(),
    is_active:     true,
    is_superuser:  false,
  })
  .await
  .unwrap()
  .id
}

fn new_review(product_id: Uuid, user_id: Option<Uuid>, rating: Option<i32>) -> NewReview {
  NewReview {
    full_name: "Ann Reader".into(),
    description: Some("Solid".into()),
    rating,
    product_id,
    user_id,
  }
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_find_user_credentials() {
  let s = store().await;
  let id = user(&s, "ann@example.com").await;

  let creds = s
    .find_credentials("ann@example.com".into())
    .await
    .unwrap()
    .expect("user exists");
  assert_eq!(creds.user.id, id);
  assert!(creds.user.is_active);
  assert_eq!(creds.password_hash, "$argon2id$placeholder");

  assert!(s.get_user(id).await.unwrap().is_some());
  assert!(s.find_credentials("bob@example.com".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
  let s = store().await;
  user(&s, "ann@example.com").await;
  let err = s
    .create_user(NewUser {
      email:         "ann@example.com".into(),
      full_name:     None,
      password_hash: "x".into(),
      is_active:     true,
      is_superuser:  true,
    })
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::Conflict(_)));
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_category() {
  let s = store().await;
  let electronics = category(&s, "Electronics", None).await;
  assert!(electronics.is_root());

  let fetched = Repository::<Category>::get(&s, electronics.id).await.unwrap();
  assert_eq!(fetched, Some(electronics));
}

#[tokio::test]
async fn get_category_missing_returns_none() {
  let s = store().await;
  let fetched = Repository::<Category>::get(&s, Uuid::new_v4()).await.unwrap();
  assert!(fetched.is_none());
}

#[tokio::test]
async fn create_category_under_missing_parent_is_not_found() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let orphan = NewCategory { name: "Orphan".into(), parent_id: Some(ghost) };
  let err = Repository::<Category>::create(&s, orphan).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { id, .. } if id == ghost));
}

#[tokio::test]
async fn set_parent_rejects_cycles() {
  let s = store().await;
  let electronics = category(&s, "Electronics", None).await;
  let phones = category(&s, "Phones", Some(electronics.id)).await;

  let err = s.set_parent(electronics.id, Some(phones.id)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Cycle { .. }));

  let err = s.set_parent(electronics.id, Some(electronics.id)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Cycle { .. }));

  // Nothing changed.
  let stored = Repository::<Category>::get(&s, electronics.id).await.unwrap().unwrap();
  assert!(stored.is_root());
}

#[tokio::test]
async fn set_parent_moves_and_detaches() {
  let s = store().await;
  let electronics = category(&s, "Electronics", None).await;
  let gadgets = category(&s, "Gadgets", None).await;
  let phones = category(&s, "Phones", Some(electronics.id)).await;

  let moved = s.set_parent(phones.id, Some(gadgets.id)).await.unwrap();
  assert_eq!(moved.parent_id, Some(gadgets.id));
  assert_eq!(children(&s, electronics.id, Page::default()).await.count, 0);

  let detached = s.set_parent(phones.id, None).await.unwrap();
  assert!(detached.is_root());
}

#[tokio::test]
async fn update_with_parent_patch_goes_through_cycle_check() {
  let s = store().await;
  let electronics = category(&s, "Electronics", None).await;
  let phones = category(&s, "Phones", Some(electronics.id)).await;

  let patch = CategoryPatch { name: Some("Everything".into()), parent_id: Some(Some(phones.id)) };
  let err = Repository::<Category>::update(&s, electronics.id, patch).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Cycle { .. }));

  // The rejected patch must not have renamed the category either.
  let stored = Repository::<Category>::get(&s, electronics.id).await.unwrap().unwrap();
  assert_eq!(stored.name, "Electronics");

  let patch = CategoryPatch { name: Some("Mobiles".into()), parent_id: None };
  let renamed = Repository::<Category>::update(&s, phones.id, patch).await.unwrap();
  assert_eq!(renamed.name, "Mobiles");
  assert_eq!(renamed.parent_id, Some(electronics.id));
}

#[tokio::test]
async fn children_and_ancestors() {
  let s = store().await;
  let electronics = category(&s, "Electronics", None).await;
  let phones = category(&s, "Phones", Some(electronics.id)).await;
  let laptops = category(&s, "Laptops", Some(electronics.id)).await;
  let smartphones = category(&s, "Smartphones", Some(phones.id)).await;

  let direct = children(&s, electronics.id, Page::default()).await;
  assert_eq!(direct.data, vec![phones.clone(), laptops.clone()]);
  assert_eq!(direct.count, 2);

  let second = children(&s, electronics.id, Page::new(1, 1)).await;
  assert_eq!(second.data, vec![laptops]);
  assert_eq!(second.count, 2);

  let ancestors = s.ancestors_of(smartphones.id).await.unwrap();
  assert_eq!(ancestors, vec![phones, electronics]);

  let err = s.ancestors_of(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { .. }));
}

#[tokio::test]
async fn list_roots_only() {
  let s = store().await;
  let electronics = category(&s, "Electronics", None).await;
  category(&s, "Phones", Some(electronics.id)).await;
  category(&s, "Books", None).await;

  let filter = CategoryFilter { roots_only: true, ..CategoryFilter::default() };
  let roots = Repository::<Category>::list(&s, filter, Page::default()).await.unwrap();
  assert_eq!(roots.count, 2);
  assert!(roots.data.iter().all(Category::is_root));

  let all = Repository::<Category>::list(&s, CategoryFilter::default(), Page::default())
    .await
    .unwrap();
  assert_eq!(all.count, 3);
}

#[tokio::test]
async fn delete_category_with_children_or_products_is_restricted() {
  let s = store().await;
  let electronics = category(&s, "Electronics", None).await;
  let phones = category(&s, "Phones", Some(electronics.id)).await;
  product(&s, "X1", phones.id).await;

  let err = Repository::<Category>::delete(&s, electronics.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Conflict(_)));
  let err = Repository::<Category>::delete(&s, phones.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::Conflict(_)));

  let empty = category(&s, "Empty", None).await;
  Repository::<Category>::delete(&s, empty.id).await.unwrap();
  let gone = Repository::<Category>::get(&s, empty.id).await.unwrap();
  assert!(gone.is_none());

  let err = Repository::<Category>::delete(&s, empty.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { .. }));
}

// ─── Products ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_sku_is_a_conflict_and_first_survives() {
  let s = store().await;
  let c = category(&s, "Electronics", None).await;
  let first = product(&s, "X1", c.id).await;

  let err = Repository::<Product>::create(&s, new_product("X1", c.id))
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::Conflict(_)));

  let fetched = Repository::<Product>::get(&s, first.id).await.unwrap().unwrap();
  assert_eq!(fetched, first);
  let all = Repository::<Product>::list(&s, ProductFilter::default(), Page::default())
    .await
    .unwrap();
  assert_eq!(all.count, 1);
}

#[tokio::test]
async fn product_needs_an_existing_category() {
  let s = store().await;
  let err = Repository::<Product>::create(&s, new_product("X1", Uuid::new_v4()))
    .await
    .unwrap_err();
  assert!(matches!(
    core(err),
    CoreError::NotFound { kind: catalog_core::EntityKind::Category, .. }
  ));
}

#[tokio::test]
async fn product_partial_update_advances_updated_at() {
  let s = store().await;
  let c = category(&s, "Electronics", None).await;
  let p = Repository::<Product>::create(
    &s,
    NewProduct { description: Some("A phone".into()), ..new_product("X1", c.id) },
  )
  .await
  .unwrap();

  let patch = ProductPatch { price: Some(Decimal::new(2500, 2)), ..Default::default() };
  let updated = Repository::<Product>::update(&s, p.id, patch).await.unwrap();

  assert_eq!(updated.price, Decimal::new(2500, 2));
  assert_eq!(updated.description.as_deref(), Some("A phone"));
  assert_eq!(updated.sku, "X1");
  assert_eq!(updated.created_at, p.created_at);
  assert!(updated.updated_at > p.updated_at);

  let stored = Repository::<Product>::get(&s, p.id).await.unwrap().unwrap();
  assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_missing_product_is_not_found() {
  let s = store().await;
  let err = Repository::<Product>::update(&s, Uuid::new_v4(), ProductPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { .. }));
}

#[tokio::test]
async fn list_products_by_category() {
  let s = store().await;
  let a = category(&s, "A", None).await;
  let b = category(&s, "B", None).await;
  product(&s, "A1", a.id).await;
  product(&s, "B1", b.id).await;
  product(&s, "A2", a.id).await;

  let filter = ProductFilter { category_id: Some(a.id) };
  let listing = Repository::<Product>::list(&s, filter, Page::default()).await.unwrap();
  assert_eq!(listing.count, 2);
  let skus: Vec<_> = listing.data.iter().map(|p| p.sku.as_str()).collect();
  assert_eq!(skus, ["A1", "A2"]);
}

#[tokio::test]
async fn pages_are_disjoint_and_concatenate() {
  let s = store().await;
  let c = category(&s, "Electronics", None).await;
  for i in 0..7 {
    product(&s, &format!("SKU-{i}"), c.id).await;
  }

  let list = |offset, limit| {
    Repository::<Product>::list(&s, ProductFilter::default(), Page::new(offset, limit))
  };
  let first = list(0, 3).await.unwrap();
  let second = list(3, 3).await.unwrap();
  let both = list(0, 6).await.unwrap();

  assert_eq!(first.count, 7);
  assert_eq!(second.count, 7);
  let joined: Vec<_> = first.data.into_iter().chain(second.data).collect();
  assert_eq!(joined, both.data);

  let tail = list(6, 3).await.unwrap();
  assert_eq!(tail.data.len(), 1);
}

#[tokio::test]
async fn deleting_a_product_removes_its_reviews() {
  let s = store().await;
  let c = category(&s, "Electronics", None).await;
  let p = product(&s, "X1", c.id).await;
  let r = Repository::<Review>::create(&s, new_review(p.id, None, Some(4)))
    .await
    .unwrap();

  Repository::<Product>::delete(&s, p.id).await.unwrap();
  let review = Repository::<Review>::get(&s, r.id).await.unwrap();
  assert!(review.is_none());
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn review_on_missing_product_is_not_found() {
  let s = store().await;
  let err = Repository::<Review>::create(&s, new_review(Uuid::new_v4(), None, None))
    .await
    .unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { kind: catalog_core::EntityKind::Product, .. }));
}

#[tokio::test]
async fn review_roundtrip_and_partial_update() {
  let s = store().await;
  let c = category(&s, "Electronics", None).await;
  let p = product(&s, "X1", c.id).await;
  let author = user(&s, "ann@example.com").await;

  let created = Repository::<Review>::create(&s, new_review(p.id, Some(author), Some(3)))
    .await
    .unwrap();
  assert_eq!(created.user_id, Some(author));

  let patch = ReviewPatch { rating: Some(Some(5)), ..Default::default() };
  let updated = Repository::<Review>::update(&s, created.id, patch).await.unwrap();
  assert_eq!(updated.rating, Some(5));
  assert_eq!(updated.description.as_deref(), Some("Solid"));
  assert!(updated.updated_at > created.updated_at);

  let patch = ReviewPatch { description: Some(None), ..Default::default() };
  let cleared = Repository::<Review>::update(&s, created.id, patch).await.unwrap();
  assert_eq!(cleared.description, None);
  assert_eq!(cleared.rating, Some(5));
}

#[tokio::test]
async fn list_reviews_filtered_by_product() {
  let s = store().await;
  let c = category(&s, "Electronics", None).await;
  let p1 = product(&s, "X1", c.id).await;
  let p2 = product(&s, "X2", c.id).await;
  for _ in 0..3 {
    Repository::<Review>::create(&s, new_review(p1.id, None, Some(5))).await.unwrap();
  }
  Repository::<Review>::create(&s, new_review(p2.id, None, Some(1))).await.unwrap();

  let filter = ReviewFilter { product_id: Some(p1.id) };
  let only_p1 = Repository::<Review>::list(&s, filter, Page::new(0, 2)).await.unwrap();
  assert_eq!(only_p1.count, 3);
  assert_eq!(only_p1.data.len(), 2);
  assert!(only_p1.data.iter().all(|r| r.product_id == p1.id));

  let all = Repository::<Review>::list(&s, ReviewFilter::default(), Page::default())
    .await
    .unwrap();
  assert_eq!(all.count, 4);
}

#[tokio::test]
async fn delete_review_twice_is_not_found() {
  let s = store().await;
  let c = category(&s, "Electronics", None).await;
  let p = product(&s, "X1", c.id).await;
  let r = Repository::<Review>::create(&s, new_review(p.id, None, None)).await.unwrap();

  Repository::<Review>::delete(&s, r.id).await.unwrap();
  let err = Repository::<Review>::delete(&s, r.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { .. }));
}

// ─── Items ───────────────────────────────────────────────────────────────────

fn new_item(title: &str, owner_id: Uuid) -> NewItem {
  NewItem { title: title.into(), description: Some("brass".into()), owner_id }
}

#[tokio::test]
async fn item_roundtrip_and_owner_filter() {
  let s = store().await;
  let ann = user(&s, "ann@example.com").await;
  let bob = user(&s, "bob@example.com").await;

  let lamp = Repository::<Item>::create(&s, new_item("Lamp", ann)).await.unwrap();
  Repository::<Item>::create(&s, new_item("Chair", ann)).await.unwrap();
  Repository::<Item>::create(&s, new_item("Desk", bob)).await.unwrap();

  let fetched = Repository::<Item>::get(&s, lamp.id).await.unwrap();
  assert_eq!(fetched.as_ref(), Some(&lamp));

  let owned = Repository::<Item>::list(&s, ItemFilter { owner_id: Some(ann) }, Page::default())
    .await
    .unwrap();
  assert_eq!(owned.count, 2);
  assert!(owned.data.iter().all(|i| i.owner_id == ann));

  let patch = ItemPatch { description: Some(None), ..Default::default() };
  let updated = Repository::<Item>::update(&s, lamp.id, patch).await.unwrap();
  assert_eq!(updated.description, None);
  assert_eq!(updated.title, "Lamp");
}

#[tokio::test]
async fn item_needs_an_existing_owner() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let err = Repository::<Item>::create(&s, new_item("Lamp", ghost)).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { id, .. } if id == ghost));
}

#[tokio::test]
async fn items_go_with_their_owner() {
  let s = store().await;
  let ann = user(&s, "ann@example.com").await;
  let lamp = Repository::<Item>::create(&s, new_item("Lamp", ann)).await.unwrap();

  s.conn
    .call(move |conn| {
      conn.execute("DELETE FROM users WHERE id = ?1", [ann.hyphenated().to_string()])?;
      Ok(())
    })
    .await
    .unwrap();

  assert!(Repository::<Item>::get(&s, lamp.id).await.unwrap().is_none());
  let err = Repository::<Item>::delete(&s, lamp.id).await.unwrap_err();
  assert!(matches!(core(err), CoreError::NotFound { .. }));
}
