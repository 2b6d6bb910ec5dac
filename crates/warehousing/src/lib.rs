//! Warehousing domain module: the inventory transfer core.
//!
//! Stock lives in warehouse aggregates as per-product line items. The
//! `TransferEngine` moves quantities between warehouses under a
//! conservation invariant, serialized by a per-warehouse lock guard, with
//! persistence behind an injected repository trait.

pub mod engine;
pub mod error;
pub mod guard;
pub mod repository;
pub mod warehouse;

pub use engine::TransferEngine;
pub use error::{TransferError, TransferResult};
pub use guard::ConcurrencyGuard;
pub use repository::{ProductLookup, RepositoryError, WarehouseRepository};
pub use warehouse::{LineItem, MAIN_WAREHOUSE_NAME, StockError, Warehouse};
