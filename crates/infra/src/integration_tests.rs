//! Engine-against-store integration tests: the transfer scenarios and the
//! concurrency guarantees, exercised through the real in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use stockflow_core::{ProductId, RepositoryError, WarehouseId};
use stockflow_products::{Product, ProductRepository};
use stockflow_warehousing::{
    MAIN_WAREHOUSE_NAME, TransferEngine, TransferError, Warehouse, WarehouseRepository,
};

use crate::in_memory::{InMemoryProductStore, InMemoryWarehouseStore};

struct Fixture {
    warehouses: Arc<InMemoryWarehouseStore>,
    engine: Arc<TransferEngine<InMemoryWarehouseStore, InMemoryProductStore>>,
    product: ProductId,
    main: WarehouseId,
    w2: WarehouseId,
    w3: WarehouseId,
}

/// Main Warehouse stocked with `main_stock` of one product, plus two empty
/// destination warehouses.
async fn fixture(main_stock: i64) -> Fixture {
    let warehouses = Arc::new(InMemoryWarehouseStore::new());
    let products = Arc::new(InMemoryProductStore::new());

    let product = ProductId::new();
    products
        .insert(&Product::create(product, "Espresso Beans 1kg", None, None, None).unwrap())
        .await
        .unwrap();

    let mut main = Warehouse::new(WarehouseId::new(), MAIN_WAREHOUSE_NAME);
    if main_stock > 0 {
        main.deposit(product, main_stock).unwrap();
    }
    let w2 = Warehouse::new(WarehouseId::new(), "Mobile One");
    let w3 = Warehouse::new(WarehouseId::new(), "Mobile Two");

    let (main_id, w2_id, w3_id) = (main.id, w2.id, w3.id);
    warehouses.save_all(&[main, w2, w3]).await.unwrap();

    let engine = Arc::new(TransferEngine::new(warehouses.clone(), products));
    Fixture {
        warehouses,
        engine,
        product,
        main: main_id,
        w2: w2_id,
        w3: w3_id,
    }
}

async fn stored_quantity(fx: &Fixture, warehouse: WarehouseId) -> Option<i64> {
    fx.warehouses
        .find_by_id(warehouse)
        .await
        .unwrap()
        .unwrap()
        .quantity_of(fx.product)
}

#[tokio::test]
async fn fixed_destination_transfer_moves_stock() {
    let fx = fixture(100).await;

    let destination = fx
        .engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 30)
        .await
        .unwrap();

    assert_eq!(destination.id, fx.w2);
    assert_eq!(destination.quantity_of(fx.product), Some(30));
    assert_eq!(stored_quantity(&fx, fx.main).await, Some(70));
    assert_eq!(stored_quantity(&fx, fx.w2).await, Some(30));
}

#[tokio::test]
async fn insufficient_stock_fails_without_mutation() {
    let fx = fixture(100).await;
    fx.engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 30)
        .await
        .unwrap();

    let err = fx
        .engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 80)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransferError::InsufficientQuantity {
            product_id: fx.product,
            warehouse_id: fx.main,
            available: 70,
            requested: 80,
        }
    );
    assert_eq!(stored_quantity(&fx, fx.main).await, Some(70));
    assert_eq!(stored_quantity(&fx, fx.w2).await, Some(30));
}

#[tokio::test]
async fn transfer_between_explicit_warehouses() {
    let fx = fixture(100).await;
    fx.engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 30)
        .await
        .unwrap();

    let (source, destination) = fx
        .engine
        .transfer_between_warehouses(fx.product, fx.w2, fx.w3, 10)
        .await
        .unwrap();

    assert_eq!(source.quantity_of(fx.product), Some(20));
    assert_eq!(destination.quantity_of(fx.product), Some(10));
    assert_eq!(stored_quantity(&fx, fx.w2).await, Some(20));
    assert_eq!(stored_quantity(&fx, fx.w3).await, Some(10));
}

#[tokio::test]
async fn self_transfer_is_rejected() {
    let fx = fixture(100).await;
    fx.engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 30)
        .await
        .unwrap();

    let err = fx
        .engine
        .transfer_between_warehouses(fx.product, fx.w2, fx.w2, 5)
        .await
        .unwrap_err();

    assert!(matches!(err, TransferError::InvalidArgument { .. }));
    assert_eq!(stored_quantity(&fx, fx.w2).await, Some(30));
}

#[tokio::test]
async fn non_positive_quantities_are_rejected() {
    let fx = fixture(100).await;

    for quantity in [0, -7] {
        let err = fx
            .engine
            .transfer_to_fixed_destination(fx.product, fx.w2, quantity)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::InvalidArgument { field: "quantity", .. }
        ));

        let err = fx
            .engine
            .transfer_between_warehouses(fx.product, fx.w2, fx.w3, quantity)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::InvalidArgument { field: "quantity", .. }
        ));
    }
    assert_eq!(stored_quantity(&fx, fx.main).await, Some(100));
}

#[tokio::test]
async fn unknown_product_and_warehouse_are_not_found() {
    let fx = fixture(100).await;

    let err = fx
        .engine
        .transfer_to_fixed_destination(ProductId::new(), fx.w2, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::NotFound { entity: "product", .. }));

    let err = fx
        .engine
        .transfer_to_fixed_destination(fx.product, WarehouseId::new(), 10)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::NotFound { entity: "warehouse", .. }));

    assert_eq!(stored_quantity(&fx, fx.main).await, Some(100));
}

#[tokio::test]
async fn product_without_line_item_in_source() {
    let fx = fixture(100).await;

    // w2 exists but has never carried the product.
    let err = fx
        .engine
        .transfer_between_warehouses(fx.product, fx.w2, fx.w3, 5)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        TransferError::ProductNotFound {
            warehouse_id: fx.w2,
            product_id: fx.product,
        }
    );
}

#[tokio::test]
async fn missing_or_duplicated_main_warehouse_is_a_configuration_error() {
    let fx = fixture(100).await;

    let spare = Warehouse::new(WarehouseId::new(), MAIN_WAREHOUSE_NAME);
    fx.warehouses.save(&spare).await.unwrap();
    let err = fx
        .engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Configuration { .. }));

    fx.warehouses.delete(spare.id).await.unwrap();
    fx.warehouses.delete(fx.main).await.unwrap();
    let err = fx
        .engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Configuration { .. }));
}

#[tokio::test]
async fn destination_upsert_accumulates_into_one_line_item() {
    let fx = fixture(100).await;

    fx.engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 30)
        .await
        .unwrap();
    let destination = fx
        .engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 20)
        .await
        .unwrap();

    assert_eq!(destination.quantity_of(fx.product), Some(50));
    assert_eq!(destination.line_items().len(), 1);
}

#[tokio::test]
async fn drained_source_keeps_zero_line_item() {
    let fx = fixture(40).await;

    fx.engine
        .transfer_to_fixed_destination(fx.product, fx.w2, 40)
        .await
        .unwrap();

    let main = fx.warehouses.find_by_id(fx.main).await.unwrap().unwrap();
    assert_eq!(main.quantity_of(fx.product), Some(0));
    assert_eq!(main.line_items().len(), 1);
}

#[tokio::test]
async fn receive_stock_upserts_into_warehouse() {
    let fx = fixture(0).await;

    fx.engine.receive_stock(fx.main, fx.product, 25).await.unwrap();
    let main = fx.engine.receive_stock(fx.main, fx.product, 5).await.unwrap();

    assert_eq!(main.quantity_of(fx.product), Some(30));
    assert_eq!(main.line_items().len(), 1);

    let err = fx
        .engine
        .receive_stock(WarehouseId::new(), fx.product, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::NotFound { entity: "warehouse", .. }));
}

#[tokio::test]
async fn deposit_overflow_is_rejected_not_wrapped() {
    let fx = fixture(0).await;

    fx.engine
        .receive_stock(fx.main, fx.product, i64::MAX)
        .await
        .unwrap();

    // A second deposit of any size would exceed i64::MAX.
    let err = fx
        .engine
        .receive_stock(fx.main, fx.product, 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransferError::InvalidArgument { field: "quantity", .. }
    ));
    assert_eq!(stored_quantity(&fx, fx.main).await, Some(i64::MAX));

    // Same guard on the transfer path: the destination is already maxed,
    // so the transfer fails and the source keeps its stock.
    fx.engine.receive_stock(fx.w2, fx.product, 1).await.unwrap();
    let err = fx
        .engine
        .transfer_between_warehouses(fx.product, fx.w2, fx.main, 1)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TransferError::InvalidArgument { field: "quantity", .. }
    ));
    assert_eq!(stored_quantity(&fx, fx.w2).await, Some(1));
    assert_eq!(stored_quantity(&fx, fx.main).await, Some(i64::MAX));
}

// Serializability: N concurrent transfers of q each from a source holding
// exactly N*q must drain it to 0 with all N succeeding.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_drain_source_exactly() {
    const N: usize = 8;
    const Q: i64 = 5;
    let fx = fixture(N as i64 * Q).await;

    let mut tasks = Vec::new();
    for _ in 0..N {
        let engine = fx.engine.clone();
        let (product, w2) = (fx.product, fx.w2);
        tasks.push(tokio::spawn(async move {
            engine.transfer_to_fixed_destination(product, w2, Q).await
        }));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(stored_quantity(&fx, fx.main).await, Some(0));
    assert_eq!(stored_quantity(&fx, fx.w2).await, Some(N as i64 * Q));
}

// With only (N-1)*q available, exactly one of the N must fail with
// InsufficientQuantity regardless of arrival order, and nothing is lost.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_transfers_with_shortfall_fail_exactly_once() {
    const N: usize = 8;
    const Q: i64 = 5;
    let fx = fixture((N as i64 - 1) * Q).await;

    let mut tasks = Vec::new();
    for _ in 0..N {
        let engine = fx.engine.clone();
        let (product, w2) = (fx.product, fx.w2);
        tasks.push(tokio::spawn(async move {
            engine.transfer_to_fixed_destination(product, w2, Q).await
        }));
    }

    let mut failures = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => {}
            Err(TransferError::InsufficientQuantity { available, requested, .. }) => {
                failures += 1;
                assert!(available < requested);
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(failures, 1);
    assert_eq!(stored_quantity(&fx, fx.main).await, Some(0));
    assert_eq!(stored_quantity(&fx, fx.w2).await, Some((N as i64 - 1) * Q));
}

/// Repository wrapper that makes every load slow, to pin lock contention.
struct SlowWarehouseStore {
    inner: Arc<InMemoryWarehouseStore>,
    delay: Duration,
}

#[async_trait]
impl WarehouseRepository for SlowWarehouseStore {
    async fn find_by_id(&self, id: WarehouseId) -> Result<Option<Warehouse>, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.find_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Warehouse>, RepositoryError> {
        self.inner.find_by_name(name).await
    }

    async fn save(&self, warehouse: &Warehouse) -> Result<(), RepositoryError> {
        self.inner.save(warehouse).await
    }

    async fn save_all(&self, warehouses: &[Warehouse]) -> Result<(), RepositoryError> {
        self.inner.save_all(warehouses).await
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn lock_wait_budget_surfaces_busy() {
    let fx = fixture(100).await;
    let products = Arc::new(InMemoryProductStore::new());
    products
        .insert(&Product::create(fx.product, "Espresso Beans 1kg", None, None, None).unwrap())
        .await
        .unwrap();

    let slow = Arc::new(SlowWarehouseStore {
        inner: fx.warehouses.clone(),
        delay: Duration::from_millis(200),
    });
    let engine = Arc::new(TransferEngine::with_wait_budget(
        slow,
        products,
        Duration::from_millis(20),
    ));

    let holder = {
        let engine = engine.clone();
        let (product, main, w2) = (fx.product, fx.main, fx.w2);
        tokio::spawn(async move {
            engine
                .transfer_between_warehouses(product, main, w2, 10)
                .await
        })
    };

    // Let the first transfer take its locks and stall inside the slow load.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let err = engine
        .transfer_between_warehouses(fx.product, fx.main, fx.w3, 10)
        .await
        .unwrap_err();
    assert!(matches!(err, TransferError::Busy { .. }));

    holder.await.unwrap().unwrap();
}
