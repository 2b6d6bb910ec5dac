//! Stores domain module (retail outlets, plain CRUD).

pub mod store;

pub use store::{ContactInfo, Store, StoreRepository};
