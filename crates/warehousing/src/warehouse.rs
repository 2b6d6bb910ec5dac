//! Warehouse aggregate: a stock-holding location with a set of line items.

use serde::{Deserialize, Serialize};

use stockflow_core::{Entity, ProductId, UserId, WarehouseId};

/// Reserved name of the single warehouse that acts as the implicit source
/// for fixed-destination transfers.
pub const MAIN_WAREHOUSE_NAME: &str = "Main Warehouse";

/// One `(product, quantity)` pairing inside a warehouse.
///
/// Invariants: `quantity >= 0`, and at most one line item per product within
/// a warehouse. Both are enforced by the `Warehouse` mutation methods; the
/// fields stay private to this module's callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Outcome of a stock mutation attempted against a single warehouse.
///
/// These are aggregate-local; the engine enriches them with ids into the
/// full `TransferError` taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    /// The warehouse has no line item for the product.
    NoLineItem,
    /// The line item exists but holds less than requested.
    Insufficient { available: i64 },
    /// The deposit would push the line item past `i64::MAX`.
    Overflow { available: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub coordinates: Option<String>,
    pub address: Option<String>,
    /// Free-form warehouse type ("fixed", "mobile", ...); not interpreted
    /// by the transfer core.
    pub kind: Option<String>,
    pub manager: Option<UserId>,
    line_items: Vec<LineItem>,
    /// Revision marker, bumped by the repository on every persisted write.
    pub version: u64,
}

impl Warehouse {
    pub fn new(id: WarehouseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            coordinates: None,
            address: None,
            kind: None,
            manager: None,
            line_items: Vec::new(),
            version: 0,
        }
    }

    /// Rebuild a warehouse from persisted parts. Deduplicates nothing; the
    /// store is trusted to uphold the one-line-item-per-product invariant
    /// it was given.
    pub fn from_parts(
        id: WarehouseId,
        name: String,
        coordinates: Option<String>,
        address: Option<String>,
        kind: Option<String>,
        manager: Option<UserId>,
        line_items: Vec<LineItem>,
        version: u64,
    ) -> Self {
        Self {
            id,
            name,
            coordinates,
            address,
            kind,
            manager,
            line_items,
            version,
        }
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn is_main(&self) -> bool {
        self.name == MAIN_WAREHOUSE_NAME
    }

    /// Current quantity of a product, or `None` if the warehouse has never
    /// carried it. A `Some(0)` is meaningful: drained line items are
    /// retained, not pruned.
    pub fn quantity_of(&self, product_id: ProductId) -> Option<i64> {
        self.line_items
            .iter()
            .find(|li| li.product_id == product_id)
            .map(|li| li.quantity)
    }

    /// Add `quantity` to the product's line item, creating it when the
    /// warehouse has no entry yet. Upsert is keyed strictly by product-id
    /// equality.
    ///
    /// Fails without mutating when the sum would exceed `i64::MAX`; any
    /// positive `quantity` can arrive here straight from a request body.
    /// Callers must have validated `quantity > 0`.
    pub fn deposit(&mut self, product_id: ProductId, quantity: i64) -> Result<(), StockError> {
        debug_assert!(quantity > 0);
        match self
            .line_items
            .iter_mut()
            .find(|li| li.product_id == product_id)
        {
            Some(li) => {
                li.quantity = li
                    .quantity
                    .checked_add(quantity)
                    .ok_or(StockError::Overflow {
                        available: li.quantity,
                    })?;
            }
            None => self.line_items.push(LineItem {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    /// Remove `quantity` from the product's line item.
    ///
    /// Fails without mutating when the line item is missing or too small.
    /// A resulting quantity of exactly zero is valid and the line item is
    /// kept in place.
    pub fn withdraw(&mut self, product_id: ProductId, quantity: i64) -> Result<(), StockError> {
        debug_assert!(quantity > 0);
        let li = self
            .line_items
            .iter_mut()
            .find(|li| li.product_id == product_id)
            .ok_or(StockError::NoLineItem)?;

        if li.quantity < quantity {
            return Err(StockError::Insufficient {
                available: li.quantity,
            });
        }

        li.quantity -= quantity;
        Ok(())
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn warehouse_with(product: ProductId, quantity: i64) -> Warehouse {
        let mut w = Warehouse::new(WarehouseId::new(), "W1");
        w.deposit(product, quantity).unwrap();
        w
    }

    #[test]
    fn deposit_creates_then_accumulates() {
        let p = ProductId::new();
        let mut w = Warehouse::new(WarehouseId::new(), "W1");

        w.deposit(p, 30).unwrap();
        assert_eq!(w.quantity_of(p), Some(30));
        assert_eq!(w.line_items().len(), 1);

        w.deposit(p, 12).unwrap();
        assert_eq!(w.quantity_of(p), Some(42));
        // Second deposit must not create a duplicate line item.
        assert_eq!(w.line_items().len(), 1);
    }

    #[test]
    fn withdraw_to_zero_retains_line_item() {
        let p = ProductId::new();
        let mut w = warehouse_with(p, 70);

        w.withdraw(p, 70).unwrap();
        assert_eq!(w.quantity_of(p), Some(0));
        assert_eq!(w.line_items().len(), 1);
    }

    #[test]
    fn withdraw_insufficient_leaves_state_unchanged() {
        let p = ProductId::new();
        let mut w = warehouse_with(p, 70);

        let err = w.withdraw(p, 80).unwrap_err();
        assert_eq!(err, StockError::Insufficient { available: 70 });
        assert_eq!(w.quantity_of(p), Some(70));
    }

    #[test]
    fn deposit_overflow_is_rejected_without_mutation() {
        let p = ProductId::new();
        let mut w = warehouse_with(p, i64::MAX);

        let err = w.deposit(p, 1).unwrap_err();
        assert_eq!(err, StockError::Overflow { available: i64::MAX });
        assert_eq!(w.quantity_of(p), Some(i64::MAX));
    }

    #[test]
    fn withdraw_unknown_product() {
        let p = ProductId::new();
        let mut w = Warehouse::new(WarehouseId::new(), "W1");
        assert_eq!(w.withdraw(p, 1).unwrap_err(), StockError::NoLineItem);
    }

    proptest! {
        // Conservation: any paired withdraw/deposit keeps the cross-warehouse
        // sum unchanged.
        #[test]
        fn transfer_conserves_total(initial in 0i64..10_000, qty in 1i64..10_000) {
            let p = ProductId::new();
            let mut src = warehouse_with(p, initial);
            let mut dst = Warehouse::new(WarehouseId::new(), "W2");

            let before = initial + dst.quantity_of(p).unwrap_or(0);
            if src.withdraw(p, qty).is_ok() {
                dst.deposit(p, qty).unwrap();
            }
            let after = src.quantity_of(p).unwrap_or(0) + dst.quantity_of(p).unwrap_or(0);
            prop_assert_eq!(before, after);
        }

        // Non-negativity: no sequence of withdrawals drives a quantity below
        // zero; over-asks are rejected.
        #[test]
        fn stock_never_goes_negative(initial in 0i64..1_000, asks in prop::collection::vec(1i64..500, 0..20)) {
            let p = ProductId::new();
            let mut w = warehouse_with(p, initial);
            for ask in asks {
                let _ = w.withdraw(p, ask);
                prop_assert!(w.quantity_of(p).unwrap() >= 0);
            }
        }
    }
}
