//! Tenant settings. Anyone in the tenant may read them; only admins change
//! them.

use axum::{extract::State, Json};
use mostrador_core::{SettingsUpdate, TenantSettings};

use crate::auth::Identity;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::AppState;

pub async fn get_settings(
    State(state): State<AppState>,
    identity: Identity,
) -> ApiResult<Json<TenantSettings>> {
    let settings = state
        .db
        .settings()
        .get_settings(&identity.tenant_id)
        .await?;
    Ok(Json(settings))
}

pub async fn update_settings(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(update): ApiJson<SettingsUpdate>,
) -> ApiResult<Json<TenantSettings>> {
    identity.require_admin()?;

    let settings = state
        .db
        .settings()
        .update_settings(&identity.tenant_id, update)
        .await?;
    Ok(Json(settings))
}
