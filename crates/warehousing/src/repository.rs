//! Repository seam for the transfer core.
//!
//! The engine owns no storage. It is handed these traits at construction
//! (connection lifecycle belongs to the process entry point) and performs
//! its read-validate-mutate-write sequence through them.

use async_trait::async_trait;

use stockflow_core::{ProductId, WarehouseId};

use crate::warehouse::Warehouse;

pub use stockflow_core::RepositoryError;

/// Load/persist warehouse aggregates.
///
/// `save_all` must be all-or-nothing: a transfer persists two warehouses as
/// one atomic unit, and a state where only one side is durably committed
/// breaks conservation and is a fatal bug, not a tolerated partial failure.
#[async_trait]
pub trait WarehouseRepository: Send + Sync {
    async fn find_by_id(&self, id: WarehouseId) -> Result<Option<Warehouse>, RepositoryError>;

    /// All warehouses with exactly this name. Returned as a vec so callers
    /// can detect a misconfigured (zero or duplicated) Main Warehouse.
    async fn find_by_name(&self, name: &str) -> Result<Vec<Warehouse>, RepositoryError>;

    async fn save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError>;

    /// Persist several warehouses atomically (all or none observable).
    async fn save_all(&self, warehouses: &[Warehouse]) -> Result<(), RepositoryError>;
}

/// Resolve product existence. The transfer core references products, it
/// never owns them.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError>;
}
