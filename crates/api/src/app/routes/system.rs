use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(caller): Extension<crate::context::CallerContext>,
) -> axum::response::Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user_id": caller.user_id(),
            "username": caller.username(),
            "role": caller.role(),
        })),
    )
        .into_response()
}
