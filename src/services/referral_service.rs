use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    ConnectionTrait,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::PlatformConfig;
use crate::db::entity::{ referral_commission, user, ReferralCommission, User };
use crate::enums::{ CommissionStatus, TxKind, TxStatus };
use crate::error::Result;
use crate::services::wallet_service::{ WalletService, WalletStat };

#[derive(serde::Serialize)]
pub struct ReferralStats {
    pub total_referrals: u64,
    pub total_commissions: Decimal,
    pub level1_count: u64,
    pub level2_count: u64,
    pub level3_count: u64,
}

/// Pays tiered commissions on a user's qualifying first deposit, walking
/// the upline to a bounded depth. Methods take the caller's connection so
/// the whole payout rides inside the deposit-approval transaction.
#[derive(Clone)]
pub struct ReferralService {
    platform: PlatformConfig,
    wallet: WalletService,
    clock: Arc<dyn Clock>,
}

impl ReferralService {
    pub fn new(platform: PlatformConfig, wallet: WalletService, clock: Arc<dyn Clock>) -> Self {
        Self { platform, wallet, clock }
    }

    /// Process commissions for a qualifying first deposit. Invoked exactly
    /// once per user, from deposit approval; later deposits never re-enter.
    pub async fn process_referral_commissions<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        deposit_id: Uuid,
        deposit_amount: Decimal
    ) -> Result<Vec<referral_commission::Model>> {
        let chain = self.referrer_chain(conn, user_id).await?;

        let mut paid = Vec::new();

        for (index, referrer_id) in chain.iter().enumerate() {
            let level = index + 1;
            let Some(rate) = self.platform.rate_for_level(level) else {
                break;
            };

            // Inactive referrers forfeit their commission, but the walk
            // continues to deeper levels.
            let referrer = User::find_by_id(*referrer_id).one(conn).await?;
            let Some(referrer) = referrer else {
                continue;
            };
            if !referrer.is_active {
                continue;
            }

            let amount = deposit_amount * rate;

            let commission = referral_commission::ActiveModel {
                id: Set(Uuid::new_v4()),
                referrer_id: Set(*referrer_id),
                referred_id: Set(user_id),
                deposit_id: Set(deposit_id),
                level: Set(level as i32),
                rate: Set(rate),
                amount: Set(amount),
                status: Set(CommissionStatus::Pending.to_string()),
                paid_at: Set(None),
                created_at: Set(self.clock.now()),
            };
            let commission = commission.insert(conn).await?;

            let commission = self.pay_commission(conn, commission).await?;
            paid.push(commission);
        }

        Ok(paid)
    }

    /// Collect the upline starting at `user_id`, direct referrer first.
    /// A bounded loop, not recursion; a cycle in referral data stops the
    /// walk instead of spinning.
    async fn referrer_chain<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid
    ) -> Result<Vec<Uuid>> {
        let mut chain: Vec<Uuid> = Vec::new();
        let mut current = user_id;

        while chain.len() < self.platform.max_referral_levels {
            let user = User::find_by_id(current).one(conn).await?;

            let Some(referrer_id) = user.and_then(|u| u.referred_by) else {
                break;
            };

            if referrer_id == user_id || chain.contains(&referrer_id) {
                break;
            }

            chain.push(referrer_id);
            current = referrer_id;
        }

        Ok(chain)
    }

    /// Credit the referrer and flip the commission to paid. No-op when the
    /// row is already paid, making the payout step idempotent.
    pub async fn pay_commission<C: ConnectionTrait>(
        &self,
        conn: &C,
        commission: referral_commission::Model
    ) -> Result<referral_commission::Model> {
        if commission.status == CommissionStatus::Paid.as_str() {
            return Ok(commission);
        }

        self.wallet.credit(conn, commission.referrer_id, commission.amount).await?;
        self.wallet.record_stat(
            conn,
            commission.referrer_id,
            WalletStat::TotalEarned,
            commission.amount
        ).await?;
        self.wallet.add_transaction(
            conn,
            commission.referrer_id,
            TxKind::Commission,
            commission.amount,
            &format!("Referral commission level {}", commission.level),
            Some(commission.id),
            TxStatus::Completed
        ).await?;

        let mut active: referral_commission::ActiveModel = commission.into();
        active.status = Set(CommissionStatus::Paid.to_string());
        active.paid_at = Set(Some(self.clock.now()));

        let updated = active.update(conn).await?;
        Ok(updated)
    }

    pub async fn user_commissions<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        limit: u64
    ) -> Result<Vec<referral_commission::Model>> {
        let commissions = ReferralCommission::find()
            .filter(referral_commission::Column::ReferrerId.eq(user_id))
            .order_by_desc(referral_commission::Column::CreatedAt)
            .limit(limit)
            .all(conn).await?;

        Ok(commissions)
    }

    pub async fn referral_stats<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid
    ) -> Result<ReferralStats> {
        let commissions = ReferralCommission::find()
            .filter(referral_commission::Column::ReferrerId.eq(user_id))
            .filter(referral_commission::Column::Status.eq(CommissionStatus::Paid.as_str()))
            .all(conn).await?;

        let total_commissions = commissions
            .iter()
            .map(|c| c.amount)
            .sum();

        let count_level = |level: i32| {
            commissions
                .iter()
                .filter(|c| c.level == level)
                .count() as u64
        };

        let mut referred: Vec<Uuid> = commissions
            .iter()
            .map(|c| c.referred_id)
            .collect();
        referred.sort_unstable();
        referred.dedup();

        Ok(ReferralStats {
            total_referrals: referred.len() as u64,
            total_commissions,
            level1_count: count_level(1),
            level2_count: count_level(2),
            level3_count: count_level(3),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{ DateTime, Utc };
    use rust_decimal_macros::dec;
    use sea_orm::{ DatabaseBackend, MockDatabase };

    fn service() -> ReferralService {
        let clock = Arc::new(
            FixedClock::new("2025-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        ReferralService::new(
            PlatformConfig::default(),
            WalletService::new(clock.clone()),
            clock
        )
    }

    fn user_model(id: Uuid, referred_by: Option<Uuid>, is_active: bool) -> user::Model {
        let now = "2025-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        user::Model {
            id,
            phone: "90000000".to_string(),
            country_code: "TG".to_string(),
            full_name: "Test User".to_string(),
            password_hash: "hash".to_string(),
            referral_code: "ABCD1234".to_string(),
            referred_by,
            is_active,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_chain_is_bounded_at_three_levels() {
        // Five-deep upline, but only three fetches happen and only three
        // ids come back.
        let ids: Vec<Uuid> = (0..6).map(|_| Uuid::new_v4()).collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![user_model(ids[0], Some(ids[1]), true)],
                vec![user_model(ids[1], Some(ids[2]), true)],
                vec![user_model(ids[2], Some(ids[3]), true)],
            ])
            .into_connection();

        let chain = service().referrer_chain(&db, ids[0]).await.unwrap();
        assert_eq!(chain, vec![ids[1], ids[2], ids[3]]);
    }

    #[tokio::test]
    async fn test_chain_stops_at_missing_referrer() {
        let ids: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![user_model(ids[0], Some(ids[1]), true)],
                vec![user_model(ids[1], None, true)],
            ])
            .into_connection();

        let chain = service().referrer_chain(&db, ids[0]).await.unwrap();
        assert_eq!(chain, vec![ids[1]]);
    }

    #[tokio::test]
    async fn test_chain_stops_on_cycle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![user_model(a, Some(b), true)],
                vec![user_model(b, Some(a), true)],
            ])
            .into_connection();

        let chain = service().referrer_chain(&db, a).await.unwrap();
        assert_eq!(chain, vec![b]);
    }

    #[tokio::test]
    async fn test_inactive_referrer_earns_nothing() {
        // Upline of one inactive referrer: no commission row is written
        // (the mock has no exec results, so any write would fail loudly).
        let ids: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![user_model(ids[0], Some(ids[1]), true)],
                vec![user_model(ids[1], None, true)],
                vec![user_model(ids[1], None, false)],
            ])
            .into_connection();

        let paid = service()
            .process_referral_commissions(&db, ids[0], Uuid::new_v4(), dec!(3000)).await
            .unwrap();
        assert!(paid.is_empty());
    }

    #[test]
    fn test_commission_amounts_follow_rate_table() {
        let platform = PlatformConfig::default();
        let deposit = dec!(10000);

        assert_eq!(deposit * platform.rate_for_level(1).unwrap(), dec!(1500.00));
        assert_eq!(deposit * platform.rate_for_level(2).unwrap(), dec!(300.00));
        assert_eq!(deposit * platform.rate_for_level(3).unwrap(), dec!(200.00));
    }
}
