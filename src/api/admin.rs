use axum::{ extract::{ Path, Query, State }, Json };
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ deposit, user, withdrawal };
use crate::enums::{ DepositStatus, WithdrawalStatus };
use crate::error::{ AppError, Result };

use super::auth::UserResponse;
use super::AppState;

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub admin_id: Uuid,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct RejectRequest {
    pub admin_id: Uuid,
    pub notes: String,
}

#[derive(Deserialize)]
pub struct SetActiveRequest {
    pub admin_id: Uuid,
    pub is_active: bool,
}

#[derive(Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "super::wallet::default_limit")]
    pub limit: u64,
}

/// Every admin route passes through here first.
async fn require_admin(state: &AppState, admin_id: Uuid) -> Result<()> {
    let admin = state.user_service.get_user(admin_id).await?;
    if !admin.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}

pub async fn list_deposits(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>
) -> Result<Json<Vec<deposit::Model>>> {
    let status = query.status
        .as_deref()
        .map(|s| s.parse::<DepositStatus>())
        .transpose()?;

    let deposits = state.deposit_service.deposits_by_status(status, query.limit).await?;

    Ok(Json(deposits))
}

pub async fn approve_deposit(
    State(state): State<AppState>,
    Path(deposit_id): Path<Uuid>,
    Json(request): Json<ApproveRequest>
) -> Result<Json<deposit::Model>> {
    require_admin(&state, request.admin_id).await?;

    let deposit = state.deposit_service
        .approve_deposit(deposit_id, request.admin_id, request.notes).await?;

    Ok(Json(deposit))
}

pub async fn reject_deposit(
    State(state): State<AppState>,
    Path(deposit_id): Path<Uuid>,
    Json(request): Json<RejectRequest>
) -> Result<Json<deposit::Model>> {
    require_admin(&state, request.admin_id).await?;

    let deposit = state.deposit_service
        .reject_deposit(deposit_id, request.admin_id, request.notes).await?;

    Ok(Json(deposit))
}

pub async fn list_withdrawals(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>
) -> Result<Json<Vec<withdrawal::Model>>> {
    let status = query.status
        .as_deref()
        .map(|s| s.parse::<WithdrawalStatus>())
        .transpose()?;

    let withdrawals = state.withdrawal_service
        .withdrawals_by_status(status, query.limit).await?;

    Ok(Json(withdrawals))
}

pub async fn approve_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    Json(request): Json<ApproveRequest>
) -> Result<Json<withdrawal::Model>> {
    require_admin(&state, request.admin_id).await?;

    let withdrawal = state.withdrawal_service
        .approve_withdrawal(withdrawal_id, request.admin_id, request.notes).await?;

    Ok(Json(withdrawal))
}

pub async fn reject_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    Json(request): Json<RejectRequest>
) -> Result<Json<withdrawal::Model>> {
    require_admin(&state, request.admin_id).await?;

    let withdrawal = state.withdrawal_service
        .reject_withdrawal(withdrawal_id, request.admin_id, request.notes).await?;

    Ok(Json(withdrawal))
}

pub async fn set_user_active(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>
) -> Result<Json<UserResponse>> {
    require_admin(&state, request.admin_id).await?;

    let user: user::Model = state.user_service.set_active(user_id, request.is_active).await?;

    Ok(Json(user.into()))
}
