//! Retail store entity. Plain CRUD, no invariants beyond a non-empty name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use stockflow_core::{DomainError, DomainResult, Entity, RepositoryError, StoreId};

/// Contact details for the person running a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number_1: Option<String>,
    pub phone_number_2: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub contact: ContactInfo,
    pub coordinates: Option<String>,
    pub address: Option<String>,
    pub picture_url: Option<String>,
}

impl Store {
    pub fn create(
        id: StoreId,
        name: impl Into<String>,
        contact: ContactInfo,
        coordinates: Option<String>,
        address: Option<String>,
        picture_url: Option<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("store name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            contact,
            coordinates,
            address,
            picture_url,
        })
    }
}

impl Entity for Store {
    type Id = StoreId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn find_by_id(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;
    async fn list(&self) -> Result<Vec<Store>, RepositoryError>;
    async fn upsert(&self, store: &Store) -> Result<(), RepositoryError>;
    /// Returns the deleted store, if it existed.
    async fn delete(&self, id: StoreId) -> Result<Option<Store>, RepositoryError>;
}
