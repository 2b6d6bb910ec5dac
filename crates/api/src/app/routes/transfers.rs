//! HTTP face of the transfer engine. Handlers validate nothing themselves;
//! the engine owns the whole taxonomy and the error mapper translates it.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(transfer))
        .route("/from-main", post(transfer_from_main))
        .route("/receipts", post(receive_stock))
}

pub async fn transfer_from_main(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TransferFromMainRequest>,
) -> axum::response::Response {
    match services
        .transfer_from_main(body.product_id, body.destination_warehouse_id, body.quantity)
        .await
    {
        Ok(destination) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "destination": dto::warehouse_to_json(&destination),
            })),
        )
            .into_response(),
        Err(e) => errors::transfer_error_to_response(e),
    }
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    match services
        .transfer(
            body.product_id,
            body.source_warehouse_id,
            body.destination_warehouse_id,
            body.quantity,
        )
        .await
    {
        Ok((source, destination)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "source": dto::warehouse_to_json(&source),
                "destination": dto::warehouse_to_json(&destination),
            })),
        )
            .into_response(),
        Err(e) => errors::transfer_error_to_response(e),
    }
}

pub async fn receive_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ReceiveStockRequest>,
) -> axum::response::Response {
    match services
        .receive_stock(body.warehouse_id, body.product_id, body.quantity)
        .await
    {
        Ok(warehouse) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "warehouse": dto::warehouse_to_json(&warehouse),
            })),
        )
            .into_response(),
        Err(e) => errors::transfer_error_to_response(e),
    }
}
