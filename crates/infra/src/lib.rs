//! `stockflow-infra` — repository implementations.
//!
//! In-memory stores are the dev/test default; a Postgres-backed warehouse
//! store is available behind the `postgres` feature.

pub mod in_memory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(test)]
mod integration_tests;

pub use in_memory::{
    InMemoryProductStore, InMemorySaleStore, InMemoryStoreDirectory, InMemoryUserStore,
    InMemoryWarehouseStore,
};

#[cfg(feature = "postgres")]
pub use postgres::PostgresWarehouseStore;
