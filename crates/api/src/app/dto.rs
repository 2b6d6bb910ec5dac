//! Request DTOs and JSON mapping helpers.
//!
//! Responses for users and warehouses go through explicit mappers: the user
//! body must never carry the password hash, and the warehouse body omits
//! the repository's revision marker.

use serde::Deserialize;
use serde_json::json;

use stockflow_auth::User;
use stockflow_core::{ProductId, UserId, WarehouseId};
use stockflow_warehousing::Warehouse;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub barcode_number: Option<String>,
    pub description: Option<String>,
    pub picture_url: Option<String>,
    /// Deposited into the Main Warehouse on creation when positive.
    #[serde(default)]
    pub initial_quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct StoreRequest {
    pub name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number_1: Option<String>,
    pub phone_number_2: Option<String>,
    pub coordinates: Option<String>,
    pub address: Option<String>,
    pub picture_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub coordinates: Option<String>,
    pub address: Option<String>,
    pub kind: Option<String>,
    pub manager: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseRequest {
    pub name: Option<String>,
    pub coordinates: Option<String>,
    pub address: Option<String>,
    pub kind: Option<String>,
    /// Only overwrites the stored manager when present.
    pub manager: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct TransferFromMainRequest {
    pub product_id: ProductId,
    pub destination_warehouse_id: WarehouseId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub product_id: ProductId,
    pub source_warehouse_id: WarehouseId,
    pub destination_warehouse_id: WarehouseId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReceiveStockRequest {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub product_id: ProductId,
    pub warehouse_id: WarehouseId,
    pub quantity: i64,
    pub total_amount: i64,
    pub paid_amount: i64,
}

pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "username": user.username,
        "full_name": user.full_name,
        "role": user.role,
    })
}

pub fn warehouse_to_json(warehouse: &Warehouse) -> serde_json::Value {
    let line_items = warehouse
        .line_items()
        .iter()
        .map(|li| {
            json!({
                "product_id": li.product_id,
                "quantity": li.quantity,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "id": warehouse.id,
        "name": warehouse.name,
        "coordinates": warehouse.coordinates,
        "address": warehouse.address,
        "kind": warehouse.kind,
        "manager": warehouse.manager,
        "line_items": line_items,
    })
}
