//! Error taxonomy for the transfer core.
//!
//! Every failure path carries structured fields so callers can branch on
//! kind instead of scraping message strings.

use thiserror::Error;

use stockflow_core::{ProductId, WarehouseId};

use crate::repository::RepositoryError;

pub type TransferResult<T> = Result<T, TransferError>;

/// Closed set of transfer failures.
///
/// Validation variants (`InvalidArgument`, `NotFound`, `ProductNotFound`,
/// `InsufficientQuantity`, `Configuration`) are detected before any mutation
/// and never leave side effects. `Busy` and `Persistence` can surface
/// mid-sequence but the engine guarantees no partial commit first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// A request field failed validation (non-positive quantity,
    /// source equals destination, ...).
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// A referenced entity does not exist at all.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The product exists globally but the source warehouse carries no
    /// line item for it.
    #[error("product {product_id} has no line item in warehouse {warehouse_id}")]
    ProductNotFound {
        warehouse_id: WarehouseId,
        product_id: ProductId,
    },

    /// Source stock is too low for the requested quantity.
    #[error(
        "insufficient quantity of {product_id} in warehouse {warehouse_id}: \
         available {available}, requested {requested}"
    )]
    InsufficientQuantity {
        product_id: ProductId,
        warehouse_id: WarehouseId,
        available: i64,
        requested: i64,
    },

    /// Zero or multiple "Main Warehouse" records exist. Operator error.
    #[error("main warehouse misconfigured: {reason}")]
    Configuration { reason: String },

    /// A per-warehouse lock could not be obtained within the wait budget.
    #[error("warehouse {warehouse_id} is busy, try again")]
    Busy { warehouse_id: WarehouseId },

    /// Underlying store failure during load or save.
    #[error("persistence failure")]
    Persistence(#[from] RepositoryError),
}

impl TransferError {
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}
