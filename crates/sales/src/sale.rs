//! Sale records: who sold how much of what, out of which warehouse, and
//! how much of the bill has been settled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult, Entity, ProductId, RepositoryError, SaleId, UserId, WarehouseId};

/// Settlement state of a sale. Derived from the amounts, never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    PartiallyPaid,
    Unpaid,
}

/// Monetary amounts are integer minor units (e.g. cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub salesperson: UserId,
    pub quantity: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub payment_status: PaymentStatus,
}

impl Sale {
    pub fn create(
        id: SaleId,
        product_id: ProductId,
        warehouse_id: WarehouseId,
        salesperson: UserId,
        quantity: i64,
        total_amount: i64,
        paid_amount: i64,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if total_amount < 0 {
            return Err(DomainError::validation("total_amount cannot be negative"));
        }
        if paid_amount < 0 || paid_amount > total_amount {
            return Err(DomainError::validation(
                "paid_amount must be between 0 and total_amount",
            ));
        }

        let remaining_amount = total_amount - paid_amount;
        let payment_status = if remaining_amount == 0 {
            PaymentStatus::Paid
        } else if paid_amount == 0 {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::PartiallyPaid
        };

        Ok(Self {
            id,
            product_id,
            warehouse_id,
            salesperson,
            quantity,
            total_amount,
            paid_amount,
            remaining_amount,
            payment_status,
        })
    }
}

impl Entity for Sale {
    type Id = SaleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[async_trait]
pub trait SaleRepository: Send + Sync {
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Sale>, RepositoryError>;
    async fn insert(&self, sale: &Sale) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(total: i64, paid: i64) -> DomainResult<Sale> {
        Sale::create(
            SaleId::new(),
            ProductId::new(),
            WarehouseId::new(),
            UserId::new(),
            3,
            total,
            paid,
        )
    }

    #[test]
    fn payment_status_is_derived() {
        assert_eq!(sale(1000, 1000).unwrap().payment_status, PaymentStatus::Paid);
        assert_eq!(sale(1000, 0).unwrap().payment_status, PaymentStatus::Unpaid);

        let partial = sale(1000, 400).unwrap();
        assert_eq!(partial.payment_status, PaymentStatus::PartiallyPaid);
        assert_eq!(partial.remaining_amount, 600);
    }

    #[test]
    fn overpayment_rejected() {
        assert!(sale(1000, 1001).is_err());
    }

    #[test]
    fn fully_paid_zero_total_counts_as_paid() {
        assert_eq!(sale(0, 0).unwrap().payment_status, PaymentStatus::Paid);
    }
}
