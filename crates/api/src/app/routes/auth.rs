//! Signup and signin. The only routes that see plaintext passwords.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::{Duration, Utc};

use stockflow_auth::{
    JwtClaims, Role, TokenAuthority, User, UserRepository, hash_password, verify_password,
};
use stockflow_core::UserId;

use crate::app::services::AppServices;
use crate::app::{TOKEN_TTL_DAYS, dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(sign_up))
        .route("/signin", post(sign_in))
}

pub async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tokens): Extension<Arc<dyn TokenAuthority>>,
    Json(body): Json<dto::SignUpRequest>,
) -> axum::response::Response {
    match services.users.find_by_username(&body.username).await {
        Ok(Some(_)) => {
            return errors::json_error(
                StatusCode::CONFLICT,
                "username_taken",
                format!("username {:?} is already registered", body.username),
            );
        }
        Ok(None) => {}
        Err(e) => return errors::repository_error_to_response(e),
    }

    let password_hash = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hashing_error",
                "failed to hash password",
            );
        }
    };

    let role = Role::new(body.role.unwrap_or_else(|| "user".to_string()));
    let user = match User::create(UserId::new(), body.username, password_hash, body.full_name, role)
    {
        Ok(u) => u,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.users.upsert(&user).await {
        return errors::repository_error_to_response(e);
    }

    let token = match mint_token(tokens.as_ref(), &user) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    tracing::info!(user_id = %user.id, username = %user.username, "user signed up");
    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user": dto::user_to_json(&user),
            "token": token,
        })),
    )
        .into_response()
}

pub async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tokens): Extension<Arc<dyn TokenAuthority>>,
    Json(body): Json<dto::SignInRequest>,
) -> axum::response::Response {
    let user = match services.users.find_by_username(&body.username).await {
        Ok(Some(u)) => u,
        // Same response for unknown user and wrong password.
        Ok(None) => return invalid_credentials(),
        Err(e) => return errors::repository_error_to_response(e),
    };

    match verify_password(&body.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            tracing::error!(error = %e, "stored password hash is malformed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "hashing_error",
                "failed to verify password",
            );
        }
    }

    let token = match mint_token(tokens.as_ref(), &user) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "user": dto::user_to_json(&user),
            "token": token,
        })),
    )
        .into_response()
}

fn mint_token(
    tokens: &dyn TokenAuthority,
    user: &User,
) -> Result<String, axum::response::Response> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.clone(),
        issued_at: now,
        expires_at: now + Duration::days(TOKEN_TTL_DAYS),
    };

    tokens.mint(&claims).map_err(|e| {
        tracing::error!(error = %e, "token minting failed");
        errors::json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "token_error",
            "failed to mint token",
        )
    })
}

fn invalid_credentials() -> axum::response::Response {
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "unknown username or wrong password",
    )
}
