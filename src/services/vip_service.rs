use std::sync::Arc;

use chrono::{ DateTime, Duration, Utc };
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::db::entity::{
    daily_earning,
    vip_investment,
    vip_product,
    DailyEarning,
    VipInvestment,
    VipProduct,
};
use crate::enums::{ InvestmentStatus, TxKind, TxStatus };
use crate::error::{ AppError, Result };
use crate::services::wallet_service::{ WalletService, WalletStat };

/// What one earnings pass did to one investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EarningOutcome {
    /// Past end_date; the position was closed without a payout.
    Matured,
    /// An earning already exists for today; only the due time rolled.
    AlreadyPaidToday,
    Paid,
}

/// Totals for one scheduler tick, for logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct EarningsReport {
    pub paid: u32,
    pub matured: u32,
    pub skipped: u32,
    pub failed: u32,
}

/// Sells fixed-yield products against wallet balance and advances every
/// active position by its frozen daily return until maturity.
#[derive(Clone)]
pub struct VipService {
    db: Arc<DatabaseConnection>,
    wallet: WalletService,
    clock: Arc<dyn Clock>,
}

impl VipService {
    pub fn new(db: Arc<DatabaseConnection>, wallet: WalletService, clock: Arc<dyn Clock>) -> Self {
        Self { db, wallet, clock }
    }

    pub async fn products(&self) -> Result<Vec<vip_product::Model>> {
        let products = VipProduct::find()
            .filter(vip_product::Column::IsActive.eq(true))
            .order_by_asc(vip_product::Column::Level)
            .all(self.db.as_ref()).await?;

        Ok(products)
    }

    pub async fn product(&self, level: i32) -> Result<vip_product::Model> {
        VipProduct::find()
            .filter(vip_product::Column::Level.eq(level))
            .filter(vip_product::Column::IsActive.eq(true))
            .one(self.db.as_ref()).await?
            .ok_or_else(|| AppError::InvalidReference(format!("No active VIP product at level {}", level)))
    }

    pub async fn purchase(
        &self,
        user_id: Uuid,
        level: i32,
        amount: Decimal
    ) -> Result<vip_investment::Model> {
        let product = self.product(level).await?;

        if amount < product.min_amount {
            return Err(
                AppError::Validation(format!("Minimum amount is {} FCFA", product.min_amount))
            );
        }

        let txn = self.db.begin().await?;

        let wallet = self.wallet.get(&txn, user_id).await?;
        if wallet.balance < amount {
            return Err(AppError::InsufficientFunds);
        }

        // Freeze the daily return now; later catalog rate changes must not
        // touch running positions.
        let daily_return_amount = amount * product.daily_return;

        let purchase_time = self.clock.now();
        let model = vip_investment::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            vip_level: Set(product.level),
            amount: Set(amount),
            daily_return_amount: Set(daily_return_amount),
            purchase_time: Set(purchase_time),
            next_earning_time: Set(purchase_time + Duration::hours(24)),
            start_date: Set(purchase_time),
            end_date: Set(purchase_time + Duration::days(product.duration_days as i64)),
            days_elapsed: Set(0),
            total_earned: Set(Decimal::ZERO),
            status: Set(InvestmentStatus::Active.to_string()),
            created_at: Set(purchase_time),
            updated_at: Set(purchase_time),
        };
        let model = model.insert(&txn).await?;

        self.wallet.debit(&txn, user_id, amount).await?;
        self.wallet.record_stat(&txn, user_id, WalletStat::TotalInvested, amount).await?;
        self.wallet.add_transaction(
            &txn,
            user_id,
            TxKind::VipPurchase,
            amount,
            &format!("VIP {} purchase", product.name),
            Some(model.id),
            TxStatus::Completed
        ).await?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn user_investments(
        &self,
        user_id: Uuid,
        limit: u64
    ) -> Result<Vec<vip_investment::Model>> {
        let investments = VipInvestment::find()
            .filter(vip_investment::Column::UserId.eq(user_id))
            .order_by_desc(vip_investment::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref()).await?;

        Ok(investments)
    }

    pub async fn user_earnings(
        &self,
        user_id: Uuid,
        limit: u64
    ) -> Result<Vec<daily_earning::Model>> {
        let earnings = DailyEarning::find()
            .filter(daily_earning::Column::UserId.eq(user_id))
            .order_by_desc(daily_earning::Column::EarningDate)
            .limit(limit)
            .all(self.db.as_ref()).await?;

        Ok(earnings)
    }

    /// One scheduler tick: advance every active investment whose earning
    /// is due. Each investment runs in its own transaction; one failure
    /// is logged and the batch moves on.
    pub async fn process_daily_earnings(&self) -> Result<EarningsReport> {
        let now = self.clock.now();

        let due = VipInvestment::find()
            .filter(vip_investment::Column::Status.eq(InvestmentStatus::Active.as_str()))
            .filter(vip_investment::Column::NextEarningTime.lte(now))
            .filter(vip_investment::Column::EndDate.gte(now))
            .all(self.db.as_ref()).await?;

        let mut report = EarningsReport::default();

        for investment in due {
            match self.process_investment(&investment, now).await {
                Ok(EarningOutcome::Paid) => {
                    report.paid += 1;
                }
                Ok(EarningOutcome::Matured) => {
                    report.matured += 1;
                }
                Ok(EarningOutcome::AlreadyPaidToday) => {
                    report.skipped += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        investment_id = %investment.id,
                        error = %e,
                        "Daily earning failed for investment; continuing with the rest"
                    );
                }
            }
        }

        // Sweep positions whose maturity passed between ticks so they stop
        // earning even if never selected as due again.
        let matured = VipInvestment::find()
            .filter(vip_investment::Column::Status.eq(InvestmentStatus::Active.as_str()))
            .filter(vip_investment::Column::EndDate.lt(now))
            .all(self.db.as_ref()).await?;

        for investment in matured {
            match self.complete_investment(self.db.as_ref(), &investment, now).await {
                Ok(()) => {
                    report.matured += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        investment_id = %investment.id,
                        error = %e,
                        "Failed to close matured investment"
                    );
                }
            }
        }

        Ok(report)
    }

    async fn process_investment(
        &self,
        investment: &vip_investment::Model,
        now: DateTime<Utc>
    ) -> Result<EarningOutcome> {
        let txn = self.db.begin().await?;

        // The clock may have advanced past maturity since selection.
        if investment.end_date < now {
            self.complete_investment(&txn, investment, now).await?;
            txn.commit().await?;
            return Ok(EarningOutcome::Matured);
        }

        // At most one earning per investment per calendar date. A rerun
        // within the same day only rolls the due time forward.
        let today = now.date_naive();
        let existing = DailyEarning::find()
            .filter(daily_earning::Column::InvestmentId.eq(investment.id))
            .filter(daily_earning::Column::EarningDate.eq(today))
            .limit(1)
            .all(&txn).await?;

        if !existing.is_empty() {
            let mut active: vip_investment::ActiveModel = investment.clone().into();
            active.next_earning_time = Set(now + Duration::hours(24));
            active.updated_at = Set(now);
            active.update(&txn).await?;

            txn.commit().await?;
            return Ok(EarningOutcome::AlreadyPaidToday);
        }

        let amount = investment.daily_return_amount;

        let earning = daily_earning::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(investment.user_id),
            investment_id: Set(investment.id),
            amount: Set(amount),
            earning_date: Set(today),
            earning_time: Set(now),
        };
        earning.insert(&txn).await?;

        self.wallet.credit(&txn, investment.user_id, amount).await?;
        self.wallet.record_stat(&txn, investment.user_id, WalletStat::TotalEarned, amount).await?;
        self.wallet.add_transaction(
            &txn,
            investment.user_id,
            TxKind::Earning,
            amount,
            &format!("Daily VIP earning - Investment #{}", short_id(investment.id)),
            Some(investment.id),
            TxStatus::Completed
        ).await?;

        let mut active: vip_investment::ActiveModel = investment.clone().into();
        active.days_elapsed = Set(investment.days_elapsed + 1);
        active.total_earned = Set(investment.total_earned + amount);
        active.next_earning_time = Set(now + Duration::hours(24));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(EarningOutcome::Paid)
    }

    async fn complete_investment<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        investment: &vip_investment::Model,
        now: DateTime<Utc>
    ) -> Result<()> {
        let mut active: vip_investment::ActiveModel = investment.clone().into();
        active.status = Set(InvestmentStatus::Completed.to_string());
        active.updated_at = Set(now);
        active.update(conn).await?;

        Ok(())
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use rust_decimal_macros::dec;
    use sea_orm::{ DatabaseBackend, MockDatabase };

    fn service(db: DatabaseConnection) -> VipService {
        let clock: Arc<FixedClock> = Arc::new(
            FixedClock::new("2025-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        VipService::new(Arc::new(db), WalletService::new(clock.clone()), clock)
    }

    fn product(level: i32, min_amount: Decimal) -> vip_product::Model {
        vip_product::Model {
            id: Uuid::new_v4(),
            level,
            name: "Bronze".to_string(),
            min_amount,
            daily_return: dec!(0.10),
            duration_days: 90,
            is_active: true,
        }
    }

    #[test]
    fn test_frozen_daily_return() {
        // 3000 at 10% daily: 300 per day regardless of later rate changes
        let product = product(1, dec!(3000));
        assert_eq!(dec!(3000) * product.daily_return, dec!(300.00));
    }

    #[tokio::test]
    async fn test_purchase_unknown_level_is_invalid_reference() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<vip_product::Model>::new()])
            .into_connection();

        let err = service(db)
            .purchase(Uuid::new_v4(), 42, dec!(3000)).await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidReference(_)));
    }

    #[tokio::test]
    async fn test_purchase_below_product_minimum() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product(1, dec!(3000))]])
            .into_connection();

        let err = service(db)
            .purchase(Uuid::new_v4(), 1, dec!(2000)).await
            .unwrap_err();

        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Minimum amount is 3000 FCFA"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn investment(
        next_earning_time: &str,
        end_date: &str,
        status: InvestmentStatus
    ) -> vip_investment::Model {
        let purchase_time = "2025-02-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        vip_investment::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            vip_level: 1,
            amount: dec!(3000),
            daily_return_amount: dec!(300),
            purchase_time,
            next_earning_time: next_earning_time.parse().unwrap(),
            start_date: purchase_time,
            end_date: end_date.parse().unwrap(),
            days_elapsed: 10,
            total_earned: dec!(3000),
            status: status.to_string(),
            created_at: purchase_time,
            updated_at: purchase_time,
        }
    }

    #[tokio::test]
    async fn test_paid_tick_credits_and_advances() {
        // First tick of the day for a due position: one DailyEarning row,
        // one wallet credit plus the earned-counter bump (the only two
        // scripted execs), and the position advances a day.
        let due = investment(
            "2025-03-01T09:00:00Z",
            "2025-05-01T10:00:00Z",
            InvestmentStatus::Active
        );
        let earning = daily_earning::Model {
            id: Uuid::new_v4(),
            user_id: due.user_id,
            investment_id: due.id,
            amount: due.daily_return_amount,
            earning_date: "2025-03-01".parse().unwrap(),
            earning_time: "2025-03-01T10:00:00Z".parse().unwrap(),
        };
        let audit = crate::db::entity::transaction::Model {
            id: Uuid::new_v4(),
            user_id: due.user_id,
            kind: TxKind::Earning.to_string(),
            amount: due.daily_return_amount,
            description: "Daily VIP earning".to_string(),
            reference_id: Some(due.id),
            status: TxStatus::Completed.to_string(),
            created_at: "2025-03-01T10:00:00Z".parse().unwrap(),
        };
        let mut advanced = due.clone();
        advanced.days_elapsed = due.days_elapsed + 1;
        advanced.total_earned = due.total_earned + due.daily_return_amount;
        advanced.next_earning_time = "2025-03-02T10:00:00Z".parse().unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![due.clone()]])
            .append_query_results([Vec::<daily_earning::Model>::new()]) // nothing paid today
            .append_query_results([vec![earning]]) // earning insert
            .append_query_results([vec![audit]]) // audit insert
            .append_query_results([vec![advanced]]) // investment update
            .append_query_results([Vec::<vip_investment::Model>::new()]) // maturity sweep
            .append_exec_results([
                sea_orm::MockExecResult { last_insert_id: 0, rows_affected: 1 }, // credit
                sea_orm::MockExecResult { last_insert_id: 0, rows_affected: 1 }, // earned stat
            ])
            .into_connection();

        let report = service(db).process_daily_earnings().await.unwrap();
        assert_eq!(report.paid, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_matured_investment_is_completed_without_payout() {
        // Clock is at 2025-03-01T10:00; this position matured the day
        // before. The sweep closes it. No exec results are scripted, so
        // any wallet credit would fail the test.
        let matured = investment(
            "2025-02-28T10:00:00Z",
            "2025-02-28T12:00:00Z",
            InvestmentStatus::Active
        );
        let mut closed = matured.clone();
        closed.status = InvestmentStatus::Completed.to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<vip_investment::Model>::new()]) // nothing due
            .append_query_results([vec![matured]]) // maturity sweep
            .append_query_results([vec![closed]]) // status update
            .into_connection();

        let report = service(db).process_daily_earnings().await.unwrap();
        assert_eq!(report.matured, 1);
        assert_eq!(report.paid, 0);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_second_tick_same_day_only_rolls_due_time() {
        // A DailyEarning already exists for today: the rerun must not pay
        // again, only push next_earning_time forward.
        let due = investment(
            "2025-03-01T09:00:00Z",
            "2025-05-01T10:00:00Z",
            InvestmentStatus::Active
        );
        let today_earning = daily_earning::Model {
            id: Uuid::new_v4(),
            user_id: due.user_id,
            investment_id: due.id,
            amount: due.daily_return_amount,
            earning_date: "2025-03-01".parse().unwrap(),
            earning_time: "2025-03-01T09:30:00Z".parse().unwrap(),
        };
        let mut rolled = due.clone();
        rolled.next_earning_time = "2025-03-02T10:00:00Z".parse().unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![due]])
            .append_query_results([vec![today_earning]])
            .append_query_results([vec![rolled]]) // due-time update
            .append_query_results([Vec::<vip_investment::Model>::new()]) // maturity sweep
            .into_connection();

        let report = service(db).process_daily_earnings().await.unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.paid, 0);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_tick_with_nothing_due_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<vip_investment::Model>::new()])
            .append_query_results([Vec::<vip_investment::Model>::new()])
            .into_connection();

        let report = service(db).process_daily_earnings().await.unwrap();
        assert_eq!(report.paid, 0);
        assert_eq!(report.matured, 0);
        assert_eq!(report.failed, 0);
    }
}
