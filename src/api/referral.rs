use axum::{ extract::{ Path, Query, State }, Json };
use uuid::Uuid;

use crate::db::entity::referral_commission;
use crate::error::Result;
use crate::services::referral_service::ReferralStats;
use crate::services::user_service::ReferralTreeNode;

use super::wallet::ListQuery;
use super::AppState;

pub async fn list_commissions(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<ListQuery>
) -> Result<Json<Vec<referral_commission::Model>>> {
    let commissions = state.referral_service
        .user_commissions(state.db.as_ref(), user_id, query.limit).await?;

    Ok(Json(commissions))
}

pub async fn get_stats(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>
) -> Result<Json<ReferralStats>> {
    let stats = state.referral_service.referral_stats(state.db.as_ref(), user_id).await?;

    Ok(Json(stats))
}

pub async fn get_tree(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>
) -> Result<Json<Vec<ReferralTreeNode>>> {
    let tree = state.user_service.referral_tree(user_id).await?;

    Ok(Json(tree))
}
