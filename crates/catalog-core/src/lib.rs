//! Core types and trait definitions for the catalog backend.
//!
//! No HTTP and no SQL here: the store and API crates build on these types.

pub mod category;
pub mod error;
pub mod hierarchy;
pub mod item;
pub mod payload;
pub mod policy;
pub mod product;
pub mod resource;
pub mod review;
pub mod store;
pub mod user;

pub use error::{Error, Result};
pub use resource::{EntityKind, Resource};
