//! Product catalog entity.
//!
//! Products are referenced by the transfer core but owned here. A product
//! is created with an initial quantity that the API layer deposits into
//! the Main Warehouse; the product record itself carries no stock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult, Entity, ProductId, RepositoryError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub barcode_number: Option<String>,
    pub description: Option<String>,
    pub picture_url: Option<String>,
}

impl Product {
    /// Validate and construct a new product. Name uniqueness is a
    /// repository concern (checked by the caller before insert).
    pub fn create(
        id: ProductId,
        name: impl Into<String>,
        barcode_number: Option<String>,
        description: Option<String>,
        picture_url: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            barcode_number,
            description,
            picture_url,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Catalog persistence seam.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn insert(&self, product: &Product) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_product_validates_name() {
        let err = Product::create(ProductId::new(), "   ", None, None, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let p = Product::create(
            ProductId::new(),
            "Espresso Beans 1kg",
            Some("6191234567890".to_string()),
            None,
            None,
        )
        .unwrap();
        assert_eq!(p.name, "Espresso Beans 1kg");
    }
}
