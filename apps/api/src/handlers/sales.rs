//! Sale endpoints. Open to every authenticated role.

use axum::{extract::State, http::StatusCode, Json};
use mostrador_core::{CreateSaleRequest, Page, Sale, SaleDetail, SaleFilter};

use crate::auth::Identity;
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::AppState;

pub async fn create_sale(
    State(state): State<AppState>,
    identity: Identity,
    ApiJson(request): ApiJson<CreateSaleRequest>,
) -> ApiResult<(StatusCode, Json<SaleDetail>)> {
    let detail = state
        .db
        .sales()
        .create_sale(&identity.tenant_id, &identity.actor_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn list_sales(
    State(state): State<AppState>,
    identity: Identity,
    ApiQuery(filter): ApiQuery<SaleFilter>,
) -> ApiResult<Json<Vec<Sale>>> {
    let sales = state
        .db
        .sales()
        .list_sales(&identity.tenant_id, &filter)
        .await?;
    Ok(Json(sales))
}

pub async fn sales_today(
    State(state): State<AppState>,
    identity: Identity,
    ApiQuery(page): ApiQuery<Page>,
) -> ApiResult<Json<Vec<Sale>>> {
    let sales = state
        .db
        .sales()
        .sales_today(&identity.tenant_id, page)
        .await?;
    Ok(Json(sales))
}

pub async fn get_sale(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<SaleDetail>> {
    let detail = state.db.sales().get_sale(&identity.tenant_id, &id).await?;
    Ok(Json(detail))
}

pub async fn cancel_sale(
    State(state): State<AppState>,
    identity: Identity,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<SaleDetail>> {
    let detail = state
        .db
        .sales()
        .cancel_sale(&identity.tenant_id, &identity.actor_id, &id)
        .await?;
    Ok(Json(detail))
}
