//! Postgres-backed warehouse store.
//!
//! Warehouses are persisted as single JSONB documents (embedded line-item
//! list keyed by product reference), matching the durable layout the
//! transfer core depends on. `save_all` runs in one transaction so a
//! two-warehouse transfer is committed all-or-nothing.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use stockflow_core::{RepositoryError, WarehouseId};
use stockflow_warehousing::{Warehouse, WarehouseRepository};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS warehouses (
    id      UUID PRIMARY KEY,
    name    TEXT NOT NULL,
    doc     JSONB NOT NULL,
    version BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS warehouses_name_idx ON warehouses (name);
"#;

#[derive(Debug, Clone)]
pub struct PostgresWarehouseStore {
    pool: PgPool,
}

impl PostgresWarehouseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the table/index if missing. Called once at startup.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        }
        Ok(())
    }

    fn decode(row: &sqlx::postgres::PgRow) -> Result<Warehouse, RepositoryError> {
        let doc: serde_json::Value = row.try_get("doc").map_err(backend)?;
        serde_json::from_value(doc).map_err(|e| RepositoryError::corrupt(e.to_string()))
    }

    async fn save_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        warehouse: &Warehouse,
    ) -> Result<(), RepositoryError> {
        let mut stored = warehouse.clone();
        stored.version += 1;
        let doc = serde_json::to_value(&stored).map_err(|e| RepositoryError::corrupt(e.to_string()))?;

        sqlx::query(
            "INSERT INTO warehouses (id, name, doc, version) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE \
             SET name = EXCLUDED.name, doc = EXCLUDED.doc, version = EXCLUDED.version",
        )
        .bind(Uuid::from(stored.id))
        .bind(&stored.name)
        .bind(doc)
        .bind(stored.version as i64)
        .execute(&mut **tx)
        .await
        .map_err(backend)?;

        Ok(())
    }

    pub async fn delete(&self, id: WarehouseId) -> Result<Option<Warehouse>, RepositoryError> {
        let row = sqlx::query("DELETE FROM warehouses WHERE id = $1 RETURNING doc")
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(Self::decode).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Warehouse>, RepositoryError> {
        let rows = sqlx::query("SELECT doc FROM warehouses ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(Self::decode).collect()
    }
}

#[async_trait]
impl WarehouseRepository for PostgresWarehouseStore {
    async fn find_by_id(&self, id: WarehouseId) -> Result<Option<Warehouse>, RepositoryError> {
        let row = sqlx::query("SELECT doc FROM warehouses WHERE id = $1")
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Warehouse>, RepositoryError> {
        let rows = sqlx::query("SELECT doc FROM warehouses WHERE name = $1 ORDER BY id")
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;
        rows.iter().map(Self::decode).collect()
    }

    async fn save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError> {
        self.save_all(std::slice::from_ref(warehouse)).await
    }

    async fn save_all(&self, warehouses: &[Warehouse]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(backend)?;
        for warehouse in warehouses {
            Self::save_in_tx(&mut tx, warehouse).await?;
        }
        tx.commit().await.map_err(backend)
    }
}

fn backend(e: sqlx::Error) -> RepositoryError {
    RepositoryError::backend(e.to_string())
}
