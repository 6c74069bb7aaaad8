//! Category endpoints. Creating one is an inventory-manager action.

use axum::{extract::State, http::StatusCode, Json};
use mostrador_core::{Category, NewCategory};

use crate::auth::Identity;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::AppState;

pub async fn create_category(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(payload): ApiJson<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    identity.require_inventory_manager()?;

    let category = state
        .db
        .catalog()
        .create_category(&identity.tenant_id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn list_categories(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<Vec<Category>>> {
    let categories = state
        .db
        .catalog()
        .list_categories(&identity.tenant_id)
        .await?;
    Ok(Json(categories))
}
