use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockflow_core::{DomainError, RepositoryError};
use stockflow_warehousing::TransferError;

/// Map the transfer core's taxonomy onto HTTP. Structured fields ride along
/// in the body so clients can branch without scraping messages.
pub fn transfer_error_to_response(err: TransferError) -> axum::response::Response {
    match err {
        TransferError::InvalidArgument { field, reason } => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "invalid_argument",
                "field": field,
                "message": reason,
            })),
        )
            .into_response(),
        TransferError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "not_found",
                "entity": entity,
                "id": id,
                "message": format!("{entity} {id} not found"),
            })),
        )
            .into_response(),
        TransferError::ProductNotFound {
            warehouse_id,
            product_id,
        } => (
            StatusCode::NOT_FOUND,
            axum::Json(json!({
                "error": "product_not_in_warehouse",
                "warehouse_id": warehouse_id,
                "product_id": product_id,
                "message": "product has no line item in this warehouse",
            })),
        )
            .into_response(),
        TransferError::InsufficientQuantity {
            product_id,
            warehouse_id,
            available,
            requested,
        } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(json!({
                "error": "insufficient_quantity",
                "product_id": product_id,
                "warehouse_id": warehouse_id,
                "available": available,
                "requested": requested,
                "message": format!("available {available}, requested {requested}"),
            })),
        )
            .into_response(),
        TransferError::Configuration { reason } => {
            tracing::error!(%reason, "main warehouse misconfigured");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", reason)
        }
        TransferError::Busy { warehouse_id } => json_error(
            StatusCode::CONFLICT,
            "busy",
            format!("warehouse {warehouse_id} is busy, try again"),
        ),
        TransferError::Persistence(e) => repository_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
    }
}

pub fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    tracing::error!(error = %err, "repository failure");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "storage_error",
        "storage failure",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
