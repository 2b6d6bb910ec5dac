use axum::{Router, routing::get};

pub mod auth;
pub mod products;
pub mod sales;
pub mod stores;
pub mod system;
pub mod transfers;
pub mod users;
pub mod warehouses;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/users", users::router())
        .nest("/products", products::router())
        .nest("/stores", stores::router())
        .nest("/warehouses", warehouses::router())
        .nest("/transfers", transfers::router())
        .nest("/sales", sales::router())
}
