//! The transfer engine: guarded stock movement between warehouses.
//!
//! Both operations follow the same discipline: validate everything that can
//! be validated, acquire the per-warehouse locks, re-load fresh state under
//! the locks, mutate owned copies, and persist both sides through a single
//! atomic `save_all`. Validation failures never mutate; once mutation has
//! begun the sequence runs to completion before the locks drop, so a
//! cancelled caller cannot leave a half-committed transfer behind.

use std::sync::Arc;
use std::time::Duration;

use stockflow_core::{ProductId, WarehouseId};

use crate::error::{TransferError, TransferResult};
use crate::guard::ConcurrencyGuard;
use crate::repository::{ProductLookup, WarehouseRepository};
use crate::warehouse::{MAIN_WAREHOUSE_NAME, StockError, Warehouse};

pub struct TransferEngine<W, P> {
    warehouses: Arc<W>,
    products: Arc<P>,
    guard: ConcurrencyGuard,
}

impl<W, P> TransferEngine<W, P>
where
    W: WarehouseRepository,
    P: ProductLookup,
{
    pub fn new(warehouses: Arc<W>, products: Arc<P>) -> Self {
        Self {
            warehouses,
            products,
            guard: ConcurrencyGuard::default(),
        }
    }

    /// Override the bounded lock wait (mostly for tests).
    pub fn with_wait_budget(warehouses: Arc<W>, products: Arc<P>, wait_budget: Duration) -> Self {
        Self {
            warehouses,
            products,
            guard: ConcurrencyGuard::new(wait_budget),
        }
    }

    /// Move `quantity` of a product from the Main Warehouse to the given
    /// destination. Returns the updated destination warehouse.
    pub async fn transfer_to_fixed_destination(
        &self,
        product_id: ProductId,
        destination_id: WarehouseId,
        quantity: i64,
    ) -> TransferResult<Warehouse> {
        validate_quantity(quantity)?;
        self.ensure_product(product_id).await?;
        let source_id = self.resolve_main_id().await?;

        let (_source, destination) = self
            .execute(product_id, source_id, destination_id, quantity)
            .await?;
        Ok(destination)
    }

    /// Move `quantity` of a product between two explicitly named
    /// warehouses. Returns both updated warehouses `(source, destination)`.
    pub async fn transfer_between_warehouses(
        &self,
        product_id: ProductId,
        source_id: WarehouseId,
        destination_id: WarehouseId,
        quantity: i64,
    ) -> TransferResult<(Warehouse, Warehouse)> {
        validate_quantity(quantity)?;
        self.ensure_product(product_id).await?;

        self.execute(product_id, source_id, destination_id, quantity)
            .await
    }

    /// Deposit `quantity` of a product into a warehouse (upsert), used for
    /// the initial stocking of a newly created product into the Main
    /// Warehouse. Guarded like the transfers so it serializes with them.
    pub async fn receive_stock(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        quantity: i64,
    ) -> TransferResult<Warehouse> {
        validate_quantity(quantity)?;
        self.ensure_product(product_id).await?;

        let _locks = self
            .guard
            .acquire([warehouse_id])
            .await
            .map_err(|warehouse_id| TransferError::Busy { warehouse_id })?;

        let mut warehouse = self.load(warehouse_id).await?;
        warehouse
            .deposit(product_id, quantity)
            .map_err(|_| deposit_overflow())?;
        self.warehouses.save(&warehouse).await?;

        tracing::info!(%warehouse_id, %product_id, quantity, "stock received");
        Ok(warehouse)
    }

    /// Resolve the Main Warehouse by its reserved name.
    pub async fn resolve_main_id(&self) -> TransferResult<WarehouseId> {
        let matches = self.warehouses.find_by_name(MAIN_WAREHOUSE_NAME).await?;
        match matches.as_slice() {
            [main] => Ok(main.id),
            [] => Err(TransferError::configuration(
                "no warehouse named \"Main Warehouse\" exists",
            )),
            many => Err(TransferError::configuration(format!(
                "{} warehouses named \"Main Warehouse\" exist",
                many.len()
            ))),
        }
    }

    /// Shared read-validate-mutate-write sequence for both transfer shapes.
    async fn execute(
        &self,
        product_id: ProductId,
        source_id: WarehouseId,
        destination_id: WarehouseId,
        quantity: i64,
    ) -> TransferResult<(Warehouse, Warehouse)> {
        if source_id == destination_id {
            return Err(TransferError::invalid_argument(
                "destination_warehouse_id",
                "source and destination warehouse are the same",
            ));
        }

        // Exclusive locks on both records, ascending-id order inside the
        // guard. Held across load, validate, mutate, and save.
        let _locks = self
            .guard
            .acquire([source_id, destination_id])
            .await
            .map_err(|warehouse_id| TransferError::Busy { warehouse_id })?;

        let mut source = self.load(source_id).await?;
        let mut destination = self.load(destination_id).await?;

        source
            .withdraw(product_id, quantity)
            .map_err(|e| match e {
                StockError::NoLineItem => TransferError::ProductNotFound {
                    warehouse_id: source_id,
                    product_id,
                },
                StockError::Insufficient { available } => TransferError::InsufficientQuantity {
                    product_id,
                    warehouse_id: source_id,
                    available,
                    requested: quantity,
                },
                // Withdrawals only subtract; overflow cannot arise here.
                StockError::Overflow { .. } => deposit_overflow(),
            })?;
        // Overflow at the destination fails the transfer before anything is
        // persisted; the withdrawn source copy is discarded with it.
        destination
            .deposit(product_id, quantity)
            .map_err(|_| deposit_overflow())?;

        // Both sides in one atomic unit; the repository must commit all or
        // nothing.
        self.warehouses
            .save_all(&[source.clone(), destination.clone()])
            .await?;

        tracing::info!(
            %product_id,
            %source_id,
            %destination_id,
            quantity,
            "transfer committed"
        );
        Ok((source, destination))
    }

    async fn ensure_product(&self, product_id: ProductId) -> TransferResult<()> {
        if self.products.exists(product_id).await? {
            Ok(())
        } else {
            Err(TransferError::not_found("product", product_id))
        }
    }

    async fn load(&self, id: WarehouseId) -> TransferResult<Warehouse> {
        self.warehouses
            .find_by_id(id)
            .await?
            .ok_or_else(|| TransferError::not_found("warehouse", id))
    }
}

fn deposit_overflow() -> TransferError {
    TransferError::invalid_argument(
        "quantity",
        "deposit would overflow the destination line item",
    )
}

fn validate_quantity(quantity: i64) -> TransferResult<()> {
    if quantity <= 0 {
        return Err(TransferError::invalid_argument(
            "quantity",
            format!("must be a positive integer, got {quantity}"),
        ));
    }
    Ok(())
}
