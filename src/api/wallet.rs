use axum::{ extract::{ Path, Query, State }, Json };
use serde::Deserialize;
use uuid::Uuid;

use crate::db::entity::{ transaction, wallet };
use crate::error::Result;

use super::AppState;

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: u64,
}

pub(super) fn default_limit() -> u64 {
    50
}

pub async fn get_wallet(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>
) -> Result<Json<wallet::Model>> {
    let wallet = state.wallet_service.get(state.db.as_ref(), user_id).await?;

    Ok(Json(wallet))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListQuery>
) -> Result<Json<Vec<transaction::Model>>> {
    let transactions = state.wallet_service
        .transactions(state.db.as_ref(), user_id, query.limit).await?;

    Ok(Json(transactions))
}
