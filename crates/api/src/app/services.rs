//! Infrastructure wiring for the HTTP layer.
//!
//! Every route handler sees one `AppServices`. The CRUD stores are always
//! in-memory; the warehouse store (the only one the transfer core writes
//! through) can be switched to Postgres via `USE_PERSISTENT_STORES=1` when
//! the crate is built with the `postgres` feature.

use std::sync::Arc;

use stockflow_core::{ProductId, RepositoryError, UserId, WarehouseId};
use stockflow_infra::{
    InMemoryProductStore, InMemorySaleStore, InMemoryStoreDirectory, InMemoryUserStore,
    InMemoryWarehouseStore,
};
use stockflow_warehousing::{TransferEngine, TransferResult, Warehouse, WarehouseRepository};

#[cfg(feature = "postgres")]
use stockflow_infra::PostgresWarehouseStore;

/// Warehouse store + engine pairing, one variant per backend.
pub enum Warehousing {
    InMemory {
        warehouses: Arc<InMemoryWarehouseStore>,
        engine: TransferEngine<InMemoryWarehouseStore, InMemoryProductStore>,
    },
    #[cfg(feature = "postgres")]
    Postgres {
        warehouses: Arc<PostgresWarehouseStore>,
        engine: TransferEngine<PostgresWarehouseStore, InMemoryProductStore>,
    },
}

pub struct AppServices {
    pub users: Arc<InMemoryUserStore>,
    pub products: Arc<InMemoryProductStore>,
    pub stores: Arc<InMemoryStoreDirectory>,
    pub sales: Arc<InMemorySaleStore>,
    warehousing: Warehousing,
}

impl AppServices {
    pub async fn warehouse_get(
        &self,
        id: WarehouseId,
    ) -> Result<Option<Warehouse>, RepositoryError> {
        match &self.warehousing {
            Warehousing::InMemory { warehouses, .. } => warehouses.find_by_id(id).await,
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { warehouses, .. } => warehouses.find_by_id(id).await,
        }
    }

    pub async fn warehouse_find_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<Warehouse>, RepositoryError> {
        match &self.warehousing {
            Warehousing::InMemory { warehouses, .. } => warehouses.find_by_name(name).await,
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { warehouses, .. } => warehouses.find_by_name(name).await,
        }
    }

    pub async fn warehouse_save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError> {
        match &self.warehousing {
            Warehousing::InMemory { warehouses, .. } => warehouses.save(warehouse).await,
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { warehouses, .. } => warehouses.save(warehouse).await,
        }
    }

    pub async fn warehouse_list(&self) -> Result<Vec<Warehouse>, RepositoryError> {
        match &self.warehousing {
            Warehousing::InMemory { warehouses, .. } => warehouses.list().await,
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { warehouses, .. } => warehouses.list().await,
        }
    }

    pub async fn warehouse_delete(
        &self,
        id: WarehouseId,
    ) -> Result<Option<Warehouse>, RepositoryError> {
        match &self.warehousing {
            Warehousing::InMemory { warehouses, .. } => warehouses.delete(id).await,
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { warehouses, .. } => warehouses.delete(id).await,
        }
    }

    pub async fn resolve_main_id(&self) -> TransferResult<WarehouseId> {
        match &self.warehousing {
            Warehousing::InMemory { engine, .. } => engine.resolve_main_id().await,
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { engine, .. } => engine.resolve_main_id().await,
        }
    }

    pub async fn transfer_from_main(
        &self,
        product_id: ProductId,
        destination_id: WarehouseId,
        quantity: i64,
    ) -> TransferResult<Warehouse> {
        match &self.warehousing {
            Warehousing::InMemory { engine, .. } => {
                engine
                    .transfer_to_fixed_destination(product_id, destination_id, quantity)
                    .await
            }
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { engine, .. } => {
                engine
                    .transfer_to_fixed_destination(product_id, destination_id, quantity)
                    .await
            }
        }
    }

    pub async fn transfer(
        &self,
        product_id: ProductId,
        source_id: WarehouseId,
        destination_id: WarehouseId,
        quantity: i64,
    ) -> TransferResult<(Warehouse, Warehouse)> {
        match &self.warehousing {
            Warehousing::InMemory { engine, .. } => {
                engine
                    .transfer_between_warehouses(product_id, source_id, destination_id, quantity)
                    .await
            }
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { engine, .. } => {
                engine
                    .transfer_between_warehouses(product_id, source_id, destination_id, quantity)
                    .await
            }
        }
    }

    pub async fn receive_stock(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        quantity: i64,
    ) -> TransferResult<Warehouse> {
        match &self.warehousing {
            Warehousing::InMemory { engine, .. } => {
                engine.receive_stock(warehouse_id, product_id, quantity).await
            }
            #[cfg(feature = "postgres")]
            Warehousing::Postgres { engine, .. } => {
                engine.receive_stock(warehouse_id, product_id, quantity).await
            }
        }
    }

    /// Warehouses whose manager field matches the given user.
    pub async fn warehouses_managed_by(
        &self,
        manager: UserId,
    ) -> Result<Vec<Warehouse>, RepositoryError> {
        let all = self.warehouse_list().await?;
        Ok(all
            .into_iter()
            .filter(|w| w.manager == Some(manager))
            .collect())
    }
}

/// Build the service graph. In-memory everywhere unless persistence is
/// both compiled in and switched on.
pub async fn build_services() -> AppServices {
    let users = Arc::new(InMemoryUserStore::new());
    let products = Arc::new(InMemoryProductStore::new());
    let stores = Arc::new(InMemoryStoreDirectory::new());
    let sales = Arc::new(InMemorySaleStore::new());

    let warehousing = build_warehousing(Arc::clone(&products)).await;

    AppServices {
        users,
        products,
        stores,
        sales,
        warehousing,
    }
}

#[cfg(not(feature = "postgres"))]
async fn build_warehousing(products: Arc<InMemoryProductStore>) -> Warehousing {
    in_memory_warehousing(products)
}

#[cfg(feature = "postgres")]
async fn build_warehousing(products: Arc<InMemoryProductStore>) -> Warehousing {
    if std::env::var("USE_PERSISTENT_STORES").as_deref() != Ok("1") {
        return in_memory_warehousing(products);
    }

    let url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| panic!("USE_PERSISTENT_STORES=1 requires DATABASE_URL"));
    let pool = sqlx::PgPool::connect(&url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to {url}: {e}"));

    let warehouses = Arc::new(PostgresWarehouseStore::new(pool));
    warehouses
        .ensure_schema()
        .await
        .unwrap_or_else(|e| panic!("failed to ensure warehouse schema: {e}"));

    tracing::info!("warehouse store: postgres");
    Warehousing::Postgres {
        warehouses: Arc::clone(&warehouses),
        engine: TransferEngine::new(warehouses, products),
    }
}

fn in_memory_warehousing(products: Arc<InMemoryProductStore>) -> Warehousing {
    let warehouses = Arc::new(InMemoryWarehouseStore::new());
    tracing::info!("warehouse store: in-memory");
    Warehousing::InMemory {
        warehouses: Arc::clone(&warehouses),
        engine: TransferEngine::new(warehouses, products),
    }
}
