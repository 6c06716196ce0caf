use axum::{ extract::{ Path, Query, State }, Json };
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::deposit;
use crate::error::Result;
use crate::services::deposit_service::CreateDepositRequest;

use super::wallet::ListQuery;
use super::AppState;

#[derive(Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
    pub payment_method: String,
    pub account_number: String,
}

pub async fn create_deposit(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<DepositRequest>
) -> Result<Json<deposit::Model>> {
    let deposit = state.deposit_service.create_deposit(user_id, CreateDepositRequest {
        amount: request.amount,
        payment_method: request.payment_method,
        account_number: request.account_number,
    }).await?;

    Ok(Json(deposit))
}

pub async fn list_deposits(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListQuery>
) -> Result<Json<Vec<deposit::Model>>> {
    let deposits = state.deposit_service.user_deposits(user_id, query.limit).await?;

    Ok(Json(deposits))
}
