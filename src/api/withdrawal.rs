use axum::{ extract::{ Path, Query, State }, Json };
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ bank, withdrawal };
use crate::error::Result;
use crate::services::withdrawal_service::CreateWithdrawalRequest;

use super::wallet::ListQuery;
use super::AppState;

#[derive(Deserialize)]
pub struct WithdrawalRequest {
    pub amount: Decimal,
    pub bank_id: Uuid,
    pub account_number: String,
    pub account_holder_name: String,
}

pub async fn list_banks(State(state): State<AppState>) -> Result<Json<Vec<bank::Model>>> {
    let banks = state.withdrawal_service.active_banks().await?;

    Ok(Json(banks))
}

pub async fn create_withdrawal(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<WithdrawalRequest>
) -> Result<Json<withdrawal::Model>> {
    let withdrawal = state.withdrawal_service.create_withdrawal(user_id, CreateWithdrawalRequest {
        amount: request.amount,
        bank_id: request.bank_id,
        account_number: request.account_number,
        account_holder_name: request.account_holder_name,
    }).await?;

    Ok(Json(withdrawal))
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListQuery>
) -> Result<Json<Vec<withdrawal::Model>>> {
    let withdrawals = state.withdrawal_service.user_withdrawals(user_id, query.limit).await?;

    Ok(Json(withdrawals))
}
