//! Stock endpoints.

use axum::{extract::State, http::StatusCode, Json};
use mostrador_core::{InventoryMovement, InventoryStatus, Product};
use mostrador_db::MovementContext;
use serde::{Deserialize, Serialize};

use crate::auth::Identity;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct StockResponse {
    pub product_id: String,
    pub current_stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
    pub notes: Option<String>,
}

/// A signed adjustment: positive adds, negative removes.
#[derive(Debug, Deserialize)]
pub struct ManualMovementRequest {
    pub delta: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_history_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_history_limit() -> u32 {
    50
}

pub async fn get_stock(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(product_id): ApiPath<String>,
) -> ApiResult<Json<StockResponse>> {
    let current_stock = state
        .db
        .ledger()
        .get_current_stock(&identity.tenant_id, &product_id)
        .await?;
    Ok(Json(StockResponse {
        product_id,
        current_stock,
    }))
}

pub async fn restock(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(product_id): ApiPath<String>,
    ApiJson(payload): ApiJson<RestockRequest>,
) -> ApiResult<(StatusCode, Json<InventoryMovement>)> {
    identity.require_inventory_manager()?;

    let ctx = MovementContext::new(&identity.tenant_id, &product_id)
        .actor(&identity.actor_id)
        .notes(payload.notes.as_deref());
    let movement = state.db.ledger().restock(&ctx, payload.quantity).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn register_movement(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(product_id): ApiPath<String>,
    ApiJson(payload): ApiJson<ManualMovementRequest>,
) -> ApiResult<(StatusCode, Json<InventoryMovement>)> {
    identity.require_inventory_manager()?;

    let ctx = MovementContext::new(&identity.tenant_id, &product_id)
        .actor(&identity.actor_id)
        .notes(payload.notes.as_deref());
    let movement = state
        .db
        .ledger()
        .register_manual_movement(&ctx, payload.delta)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn list_movements(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(product_id): ApiPath<String>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ApiResult<Json<Vec<InventoryMovement>>> {
    let movements = state
        .db
        .ledger()
        .movement_history(&identity.tenant_id, &product_id, query.limit, query.offset)
        .await?;
    Ok(Json(movements))
}

pub async fn low_stock(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state.db.ledger().low_stock(&identity.tenant_id).await?;
    Ok(Json(products))
}

pub async fn summary(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Vec<InventoryStatus>>> {
    let statuses = state.db.ledger().summary(&identity.tenant_id).await?;
    Ok(Json(statuses))
}
