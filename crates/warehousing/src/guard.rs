//! Serialization of operations that touch overlapping warehouse records.
//!
//! A transfer is a read-validate-mutate-write sequence across two
//! independently stored records with no native multi-record transaction.
//! Without serialization, two transfers that read the same source before
//! either writes both pass the sufficiency check against stale data and
//! then both subtract (lost update / write skew). The guard prevents this
//! pessimistically: one async mutex per warehouse id, always acquired in
//! ascending id order so swapped source/destination pairs cannot deadlock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::{Instant, timeout_at};

use stockflow_core::WarehouseId;

/// Per-warehouse lock registry with a bounded acquisition wait.
#[derive(Debug)]
pub struct ConcurrencyGuard {
    locks: StdMutex<HashMap<WarehouseId, Arc<AsyncMutex<()>>>>,
    wait_budget: Duration,
}

/// Held locks for one operation. Dropping releases them.
#[derive(Debug)]
pub struct LockSet {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl Default for ConcurrencyGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WAIT_BUDGET)
    }
}

impl ConcurrencyGuard {
    /// Default bound on how long an operation may wait for its locks.
    pub const DEFAULT_WAIT_BUDGET: Duration = Duration::from_secs(2);

    pub fn new(wait_budget: Duration) -> Self {
        Self {
            locks: StdMutex::new(HashMap::new()),
            wait_budget,
        }
    }

    // TODO: slots are never evicted; add an idle sweep if warehouse churn
    // ever makes the registry grow unbounded.
    fn slot(&self, id: WarehouseId) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .unwrap()
            .entry(id)
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Acquire exclusive locks for every given warehouse id, in ascending
    /// id order regardless of source/destination role.
    ///
    /// The wait budget spans the whole acquisition; on expiry the ids
    /// locked so far are released and the warehouse that could not be
    /// locked is returned so the caller can surface `Busy`.
    pub async fn acquire(
        &self,
        ids: impl IntoIterator<Item = WarehouseId>,
    ) -> Result<LockSet, WarehouseId> {
        let mut ids: Vec<WarehouseId> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();

        let deadline = Instant::now() + self.wait_budget;
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            let slot = self.slot(id);
            match timeout_at(deadline, slot.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                // Guards collected so far drop here, releasing their locks.
                Err(_elapsed) => return Err(id),
            }
        }

        Ok(LockSet { _guards: guards })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn swapped_pairs_do_not_deadlock() {
        let guard = Arc::new(ConcurrencyGuard::new(Duration::from_secs(1)));
        let a = WarehouseId::new();
        let b = WarehouseId::new();

        let mut tasks = Vec::new();
        for (x, y) in [(a, b), (b, a), (a, b), (b, a)] {
            let guard = guard.clone();
            tasks.push(tokio::spawn(async move {
                let held = guard.acquire([x, y]).await.unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
                drop(held);
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }
    }

    #[tokio::test]
    async fn bounded_wait_reports_busy_warehouse() {
        let guard = ConcurrencyGuard::new(Duration::from_millis(20));
        let a = WarehouseId::new();
        let b = WarehouseId::new();

        let held = guard.acquire([a]).await.unwrap();
        let busy = guard.acquire([a, b]).await.unwrap_err();
        assert_eq!(busy, a);

        drop(held);
        assert!(guard.acquire([a, b]).await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_ids_collapse_to_one_lock() {
        let guard = ConcurrencyGuard::new(Duration::from_millis(50));
        let a = WarehouseId::new();
        // Would self-deadlock if the duplicate were locked twice.
        assert!(guard.acquire([a, a]).await.is_ok());
    }
}
