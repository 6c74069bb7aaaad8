//! Product catalog endpoints.

use axum::{extract::State, http::StatusCode, Json};
use mostrador_core::{NewProduct, Product, ProductFilter, ProductUpdate};

use crate::auth::Identity;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

pub async fn create_product(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(payload): ApiJson<NewProduct>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    identity.require_inventory_manager()?;

    let product = state
        .db
        .catalog()
        .create_product(&identity.tenant_id, &identity.actor_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    identity: Identity,
    ApiQuery(filter): ApiQuery<ProductFilter>,
) -> ApiResult<Json<Vec<Product>>> {
    let products = state
        .db
        .catalog()
        .list_products(&identity.tenant_id, &filter)
        .await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .catalog()
        .get_product(&identity.tenant_id, &id)
        .await?;
    Ok(Json(product))
}

pub async fn update_product(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(id): ApiPath<String>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> ApiResult<Json<Product>> {
    identity.require_inventory_manager()?;

    let product = state
        .db
        .catalog()
        .update_product(&identity.tenant_id, &id, update)
        .await?;
    Ok(Json(product))
}

/// `DELETE` only deactivates: sold products keep their history.
pub async fn deactivate_product(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<Product>> {
    identity.require_inventory_manager()?;

    let product = state
        .db
        .catalog()
        .deactivate_product(&identity.tenant_id, &id)
        .await?;
    Ok(Json(product))
}
