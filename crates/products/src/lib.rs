//! Products domain module.
//!
//! Pure catalog logic: no IO, no HTTP, no storage.

pub mod product;

pub use product::{Product, ProductRepository};
