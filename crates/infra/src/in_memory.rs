//! In-memory repository implementations.
//!
//! Intended for tests/dev. Not optimized for performance. Each store is a
//! `RwLock`'d map; `InMemoryWarehouseStore::save_all` swaps every record
//! under one write lock so a two-warehouse transfer commits atomically.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockflow_auth::{User, UserRepository};
use stockflow_core::{ProductId, RepositoryError, SaleId, StoreId, UserId, WarehouseId};
use stockflow_products::{Product, ProductRepository};
use stockflow_sales::{Sale, SaleRepository};
use stockflow_stores::{Store, StoreRepository};
use stockflow_warehousing::{ProductLookup, Warehouse, WarehouseRepository};

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::backend("lock poisoned")
}

/// Warehouse documents keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryWarehouseStore {
    inner: RwLock<HashMap<WarehouseId, Warehouse>>,
}

impl InMemoryWarehouseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn delete(&self, id: WarehouseId) -> Result<Option<Warehouse>, RepositoryError> {
        Ok(self.inner.write().map_err(poisoned)?.remove(&id))
    }

    pub async fn list(&self) -> Result<Vec<Warehouse>, RepositoryError> {
        let mut all: Vec<Warehouse> = self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[async_trait]
impl WarehouseRepository for InMemoryWarehouseStore {
    async fn find_by_id(&self, id: WarehouseId) -> Result<Option<Warehouse>, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Warehouse>, RepositoryError> {
        let mut matches: Vec<Warehouse> = self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .filter(|w| w.name == name)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matches)
    }

    async fn save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError> {
        self.save_all(std::slice::from_ref(warehouse)).await
    }

    async fn save_all(&self, warehouses: &[Warehouse]) -> Result<(), RepositoryError> {
        // One write lock for the whole batch: all records become visible
        // together or not at all.
        let mut inner = self.inner.write().map_err(poisoned)?;
        for warehouse in warehouses {
            let mut stored = warehouse.clone();
            stored.version += 1;
            inner.insert(stored.id, stored);
        }
        Ok(())
    }
}

/// Product catalog keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn delete(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.inner.write().map_err(poisoned)?.remove(&id))
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductStore {
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut all: Vec<Product> = self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(product.id, product.clone());
        Ok(())
    }
}

#[async_trait]
impl ProductLookup for InMemoryProductStore {
    async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.contains_key(&id))
    }
}

/// User accounts keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    inner: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let mut all: Vec<User> = self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.inner.write().map_err(poisoned)?.remove(&id))
    }
}

/// Retail stores keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryStoreDirectory {
    inner: RwLock<HashMap<StoreId, Store>>,
}

impl InMemoryStoreDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreRepository for InMemoryStoreDirectory {
    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Store>, RepositoryError> {
        let mut all: Vec<Store> = self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn upsert(&self, store: &Store) -> Result<(), RepositoryError> {
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(store.id, store.clone());
        Ok(())
    }

    async fn delete(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        Ok(self.inner.write().map_err(poisoned)?.remove(&id))
    }
}

/// Sales keyed by id.
#[derive(Debug, Default)]
pub struct InMemorySaleStore {
    inner: RwLock<HashMap<SaleId, Sale>>,
}

impl InMemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SaleRepository for InMemorySaleStore {
    async fn find_by_id(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError> {
        Ok(self.inner.read().map_err(poisoned)?.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Sale>, RepositoryError> {
        let mut all: Vec<Sale> = self
            .inner
            .read()
            .map_err(poisoned)?
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn insert(&self, sale: &Sale) -> Result<(), RepositoryError> {
        self.inner
            .write()
            .map_err(poisoned)?
            .insert(sale.id, sale.clone());
        Ok(())
    }
}
