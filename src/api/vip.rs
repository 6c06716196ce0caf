use axum::{ extract::{ Path, Query, State }, Json };
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ daily_earning, vip_investment, vip_product };
use crate::error::Result;

use super::wallet::ListQuery;
use super::AppState;

#[derive(Deserialize)]
pub struct PurchaseRequest {
    pub level: i32,
    pub amount: Decimal,
}

pub async fn list_products(
    State(state): State<AppState>
) -> Result<Json<Vec<vip_product::Model>>> {
    let products = state.vip_service.products().await?;

    Ok(Json(products))
}

pub async fn purchase(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<PurchaseRequest>
) -> Result<Json<vip_investment::Model>> {
    let investment = state.vip_service
        .purchase(user_id, request.level, request.amount).await?;

    Ok(Json(investment))
}

pub async fn list_investments(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListQuery>
) -> Result<Json<Vec<vip_investment::Model>>> {
    let investments = state.vip_service.user_investments(user_id, query.limit).await?;

    Ok(Json(investments))
}

pub async fn list_earnings(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListQuery>
) -> Result<Json<Vec<daily_earning::Model>>> {
    let earnings = state.vip_service.user_earnings(user_id, query.limit).await?;

    Ok(Json(earnings))
}
