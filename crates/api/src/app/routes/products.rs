use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockflow_core::{ProductId, WarehouseId};
use stockflow_products::{Product, ProductRepository};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_product).get(list_products))
        .route("/:id", get(get_product))
}

/// Create a product and, when `initial_quantity > 0`, deposit that stock
/// into the Main Warehouse through the transfer engine.
pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    if body.initial_quantity < 0 {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_argument",
            "initial_quantity cannot be negative",
        );
    }

    match services.products.find_by_name(&body.name).await {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "name_taken",
                format!("a product named {:?} already exists", body.name),
            );
        }
        Ok(None) => {}
        Err(e) => return errors::repository_error_to_response(e),
    }

    // Resolve the stocking target before inserting anything so a missing
    // Main Warehouse fails the whole request cleanly.
    let main_id = if body.initial_quantity > 0 {
        match services.resolve_main_id().await {
            Ok(id) => Some(id),
            Err(e) => return errors::transfer_error_to_response(e),
        }
    } else {
        None
    };

    let product = match Product::create(
        ProductId::new(),
        body.name,
        body.barcode_number,
        body.description,
        body.picture_url,
    ) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.products.insert(&product).await {
        return errors::repository_error_to_response(e);
    }

    if let Some(main_id) = main_id {
        if let Err(resp) =
            stock_or_roll_back(&services, &product, main_id, body.initial_quantity).await
        {
            return resp;
        }
    }

    tracing::info!(product_id = %product.id, name = %product.name, "product created");
    (StatusCode::CREATED, Json(product)).into_response()
}

/// Deposit the initial stock, undoing the catalog insert if the deposit
/// cannot commit so a failed request never leaves an unstocked product
/// behind.
async fn stock_or_roll_back(
    services: &AppServices,
    product: &Product,
    main_id: WarehouseId,
    quantity: i64,
) -> Result<(), axum::response::Response> {
    match services.receive_stock(main_id, product.id, quantity).await {
        Ok(_) => Ok(()),
        Err(e) => {
            if let Err(del) = services.products.delete(product.id).await {
                tracing::error!(
                    product_id = %product.id,
                    error = %del,
                    "failed to roll back unstocked product"
                );
            }
            Err(errors::transfer_error_to_response(e))
        }
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };

    match services.products.find_by_id(id).await {
        Ok(Some(product)) => (StatusCode::OK, Json(product)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.products.list().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::build_services;

    #[tokio::test]
    async fn failed_stocking_rolls_back_the_catalog_insert() {
        let services = Arc::new(build_services().await);
        let product =
            Product::create(ProductId::new(), "Espresso Beans 1kg", None, None, None).unwrap();
        services.products.insert(&product).await.unwrap();

        // No warehouse with this id exists, so the deposit cannot commit.
        let resp = stock_or_roll_back(&services, &product, WarehouseId::new(), 5)
            .await
            .unwrap_err();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(
            services
                .products
                .find_by_id(product.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
