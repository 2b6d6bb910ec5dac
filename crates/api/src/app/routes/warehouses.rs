use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockflow_core::{ProductId, UserId, WarehouseId};
use stockflow_warehousing::Warehouse;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_warehouse).get(list_warehouses))
        .route(
            "/:id",
            get(get_warehouse)
                .put(update_warehouse)
                .delete(delete_warehouse),
        )
        .route("/managed-by/:manager_id", get(managed_warehouses))
        .route(
            "/:id/products/:product_id/quantity",
            get(product_quantity),
        )
}

pub async fn create_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateWarehouseRequest>,
) -> axum::response::Response {
    if body.name.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "warehouse name cannot be empty",
        );
    }

    match services.warehouse_find_by_name(&body.name).await {
        Ok(matches) if !matches.is_empty() => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "name_taken",
                format!("a warehouse named {:?} already exists", body.name),
            );
        }
        Ok(_) => {}
        Err(e) => return errors::repository_error_to_response(e),
    }

    let mut warehouse = Warehouse::new(WarehouseId::new(), body.name);
    warehouse.coordinates = body.coordinates;
    warehouse.address = body.address;
    warehouse.kind = body.kind;
    warehouse.manager = body.manager;

    if let Err(e) = services.warehouse_save(&warehouse).await {
        return errors::repository_error_to_response(e);
    }

    tracing::info!(warehouse_id = %warehouse.id, name = %warehouse.name, "warehouse created");
    (StatusCode::CREATED, Json(dto::warehouse_to_json(&warehouse))).into_response()
}

pub async fn list_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.warehouse_list().await {
        Ok(all) => {
            let items = all.iter().map(dto::warehouse_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn get_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.warehouse_get(id).await {
        Ok(Some(w)) => (StatusCode::OK, Json(dto::warehouse_to_json(&w))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn managed_warehouses(
    Extension(services): Extension<Arc<AppServices>>,
    Path(manager_id): Path<String>,
) -> axum::response::Response {
    let manager: UserId = match manager_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id");
        }
    };

    match services.warehouses_managed_by(manager).await {
        Ok(all) => {
            let items = all.iter().map(dto::warehouse_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// Partial update. The manager field is only overwritten when the request
/// carries one, so updating an address cannot silently drop the manager.
pub async fn update_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateWarehouseRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let mut warehouse = match services.warehouse_get(id).await {
        Ok(Some(w)) => w,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found");
        }
        Err(e) => return errors::repository_error_to_response(e),
    };

    if let Some(name) = body.name {
        if name.trim().is_empty() {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "warehouse name cannot be empty",
            );
        }
        if name != warehouse.name {
            match services.warehouse_find_by_name(&name).await {
                Ok(matches) if matches.iter().any(|w| w.id != id) => {
                    return errors::json_error(
                        StatusCode::CONFLICT,
                        "name_taken",
                        format!("a warehouse named {name:?} already exists"),
                    );
                }
                Ok(_) => {}
                Err(e) => return errors::repository_error_to_response(e),
            }
            warehouse.name = name;
        }
    }
    if let Some(coordinates) = body.coordinates {
        warehouse.coordinates = Some(coordinates);
    }
    if let Some(address) = body.address {
        warehouse.address = Some(address);
    }
    if let Some(kind) = body.kind {
        warehouse.kind = Some(kind);
    }
    if let Some(manager) = body.manager {
        warehouse.manager = Some(manager);
    }

    if let Err(e) = services.warehouse_save(&warehouse).await {
        return errors::repository_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::warehouse_to_json(&warehouse))).into_response()
}

pub async fn delete_warehouse(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.warehouse_delete(id).await {
        Ok(Some(w)) => (StatusCode::OK, Json(dto::warehouse_to_json(&w))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// Current line-item quantity. A drained line item answers `0`; a product
/// the warehouse never carried answers 404.
pub async fn product_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Path((id, product_id)): Path<(String, String)>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let product_id: ProductId = match product_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id");
        }
    };

    let warehouse = match services.warehouse_get(id).await {
        Ok(Some(w)) => w,
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found");
        }
        Err(e) => return errors::repository_error_to_response(e),
    };

    match warehouse.quantity_of(product_id) {
        Some(quantity) => (
            StatusCode::OK,
            Json(serde_json::json!({ "quantity": quantity })),
        )
            .into_response(),
        None => errors::json_error(
            StatusCode::NOT_FOUND,
            "product_not_in_warehouse",
            "product has no line item in this warehouse",
        ),
    }
}

fn parse_id(raw: &str) -> Result<WarehouseId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid warehouse id")
    })
}
