use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use stockflow_core::StoreId;
use stockflow_stores::{ContactInfo, Store, StoreRepository};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_store).get(list_stores))
        .route("/:id", get(get_store).put(update_store).delete(delete_store))
}

fn store_from_request(id: StoreId, body: dto::StoreRequest) -> Result<Store, stockflow_core::DomainError> {
    Store::create(
        id,
        body.name,
        ContactInfo {
            first_name: body.first_name,
            last_name: body.last_name,
            phone_number_1: body.phone_number_1,
            phone_number_2: body.phone_number_2,
        },
        body.coordinates,
        body.address,
        body.picture_url,
    )
}

pub async fn create_store(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::StoreRequest>,
) -> axum::response::Response {
    let store = match store_from_request(StoreId::new(), body) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.stores.upsert(&store).await {
        return errors::repository_error_to_response(e);
    }

    (StatusCode::CREATED, Json(store)).into_response()
}

pub async fn list_stores(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.stores.list().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn get_store(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.stores.find_by_id(id).await {
        Ok(Some(store)) => (StatusCode::OK, Json(store)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_store(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::StoreRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.stores.find_by_id(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found"),
        Err(e) => return errors::repository_error_to_response(e),
    }

    let store = match store_from_request(id, body) {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.stores.upsert(&store).await {
        return errors::repository_error_to_response(e);
    }

    (StatusCode::OK, Json(store)).into_response()
}

pub async fn delete_store(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.stores.delete(id).await {
        Ok(Some(store)) => (StatusCode::OK, Json(store)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "store not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<StoreId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid store id")
    })
}
