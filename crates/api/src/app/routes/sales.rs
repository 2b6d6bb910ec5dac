use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockflow_core::SaleId;
use stockflow_products::ProductRepository;
use stockflow_sales::{Sale, SaleRepository};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_sale).get(list_sales))
        .route("/:id", get(get_sale))
}

/// Record a sale. The salesperson is always the authenticated caller, not
/// a request field.
pub async fn create_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateSaleRequest>,
) -> axum::response::Response {
    match services.products.find_by_id(body.product_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found");
        }
        Err(e) => return errors::repository_error_to_response(e),
    }

    match services.warehouse_get(body.warehouse_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "warehouse not found");
        }
        Err(e) => return errors::repository_error_to_response(e),
    }

    let sale = match Sale::create(
        SaleId::new(),
        body.product_id,
        body.warehouse_id,
        caller.user_id(),
        body.quantity,
        body.total_amount,
        body.paid_amount,
    ) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.sales.insert(&sale).await {
        return errors::repository_error_to_response(e);
    }

    tracing::info!(sale_id = %sale.id, salesperson = %sale.salesperson, "sale recorded");
    (StatusCode::CREATED, Json(sale)).into_response()
}

pub async fn get_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SaleId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid sale id");
        }
    };

    match services.sales.find_by_id(id).await {
        Ok(Some(sale)) => (StatusCode::OK, Json(sale)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "sale not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn list_sales(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.sales.list().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
