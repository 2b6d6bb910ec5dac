use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use stockflow_auth::{Role, User, UserRepository, hash_password};
use stockflow_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.users.list().await {
        Ok(users) => {
            let items = users.iter().map(dto::user_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.users.find_by_id(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateUserRequest>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let existing = match services.users.find_by_id(id).await {
        Ok(Some(u)) => u,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::repository_error_to_response(e),
    };

    let username = body.username.unwrap_or_else(|| existing.username.clone());
    let full_name = body.full_name.unwrap_or_else(|| existing.full_name.clone());
    let role = body.role.map(Role::new).unwrap_or_else(|| existing.role.clone());
    let password_hash = match body.password {
        Some(plain) => match hash_password(&plain) {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(error = %e, "password hashing failed");
                return errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "hashing_error",
                    "failed to hash password",
                );
            }
        },
        None => existing.password_hash,
    };

    // Renames must not collide with another account.
    if username != existing.username {
        match services.users.find_by_username(&username).await {
            Ok(Some(other)) if other.id != id => {
                return errors::json_error(
                    StatusCode::CONFLICT,
                    "username_taken",
                    format!("username {username:?} is already registered"),
                );
            }
            Ok(_) => {}
            Err(e) => return errors::repository_error_to_response(e),
        }
    }

    let updated = match User::create(id, username, password_hash, full_name, role) {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.users.upsert(&updated).await {
        return errors::repository_error_to_response(e);
    }

    (StatusCode::OK, Json(dto::user_to_json(&updated))).into_response()
}

pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.users.delete(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::repository_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<UserId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid user id")
    })
}
