use std::sync::Arc;

use chrono::{ Duration, NaiveTime };
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    PaginatorTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::PlatformConfig;
use crate::db::entity::{ bank, withdrawal, Bank, Withdrawal };
use crate::enums::{ TxKind, TxStatus, WithdrawalStatus };
use crate::error::{ AppError, Result };
use crate::services::wallet_service::{ WalletService, WalletStat };

#[derive(Debug, Clone)]
pub struct CreateWithdrawalRequest {
    pub amount: Decimal,
    pub bank_id: Uuid,
    pub account_number: String,
    pub account_holder_name: String,
}

/// Fee and net payout for a requested gross amount.
pub fn compute_fees(amount: Decimal, fee_rate: Decimal) -> (Decimal, Decimal) {
    let fees = amount * fee_rate;
    (fees, amount - fees)
}

/// Withdrawal requests with an immediate hold: the gross amount leaves
/// the balance at creation so the same funds cannot back two outstanding
/// requests. Rejection reverses the hold; approval settles with no
/// further balance change.
#[derive(Clone)]
pub struct WithdrawalService {
    db: Arc<DatabaseConnection>,
    platform: PlatformConfig,
    wallet: WalletService,
    clock: Arc<dyn Clock>,
}

impl WithdrawalService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        platform: PlatformConfig,
        wallet: WalletService,
        clock: Arc<dyn Clock>
    ) -> Self {
        Self { db, platform, wallet, clock }
    }

    pub async fn active_banks(&self) -> Result<Vec<bank::Model>> {
        let banks = Bank::find()
            .filter(bank::Column::IsActive.eq(true))
            .order_by_asc(bank::Column::Name)
            .all(self.db.as_ref()).await?;

        Ok(banks)
    }

    pub async fn create_withdrawal(
        &self,
        user_id: Uuid,
        request: CreateWithdrawalRequest
    ) -> Result<withdrawal::Model> {
        if request.amount < self.platform.min_withdrawal {
            return Err(
                AppError::Validation(
                    format!("Minimum withdrawal is {} FCFA", self.platform.min_withdrawal)
                )
            );
        }

        let txn = self.db.begin().await?;

        // Calendar-day window on the server clock. Rejected requests do
        // not count against the limit.
        let day_start = self.clock.today().and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + Duration::days(1);

        let today_count = Withdrawal::find()
            .filter(withdrawal::Column::UserId.eq(user_id))
            .filter(withdrawal::Column::CreatedAt.gte(day_start))
            .filter(withdrawal::Column::CreatedAt.lt(day_end))
            .filter(
                withdrawal::Column::Status.is_in([
                    WithdrawalStatus::Pending.as_str(),
                    WithdrawalStatus::Completed.as_str(),
                ])
            )
            .count(&txn).await?;

        if today_count >= self.platform.max_daily_withdrawals {
            return Err(
                AppError::Validation(
                    format!(
                        "Maximum {} withdrawals per day",
                        self.platform.max_daily_withdrawals
                    )
                )
            );
        }

        // The hold is on the gross amount, so the balance check is too.
        let wallet = self.wallet.get(&txn, user_id).await?;
        if wallet.balance < request.amount {
            return Err(AppError::InsufficientFunds);
        }

        let bank = Bank::find_by_id(request.bank_id)
            .filter(bank::Column::IsActive.eq(true))
            .one(&txn).await?
            .ok_or_else(|| AppError::InvalidReference("Invalid bank selected".to_string()))?;

        let (fees, net_amount) = compute_fees(request.amount, self.platform.withdrawal_fee_rate);

        let now = self.clock.now();
        let model = withdrawal::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount: Set(request.amount),
            fees: Set(fees),
            net_amount: Set(net_amount),
            bank_id: Set(bank.id),
            account_number: Set(request.account_number),
            account_holder_name: Set(request.account_holder_name),
            status: Set(WithdrawalStatus::Pending.to_string()),
            processed_by: Set(None),
            processed_at: Set(None),
            admin_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = model.insert(&txn).await?;

        // Immediate hold: debit the gross amount before any admin action.
        self.wallet.debit(&txn, user_id, model.amount).await?;
        self.wallet.record_stat(&txn, user_id, WalletStat::TotalWithdrawn, model.amount).await?;
        self.wallet.add_transaction(
            &txn,
            user_id,
            TxKind::Withdrawal,
            model.amount,
            &format!("Withdrawal request - {}", bank.name),
            Some(model.id),
            TxStatus::Pending
        ).await?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn approve_withdrawal(
        &self,
        withdrawal_id: Uuid,
        admin_id: Uuid,
        notes: Option<String>
    ) -> Result<withdrawal::Model> {
        let txn = self.db.begin().await?;

        let model = Withdrawal::find_by_id(withdrawal_id)
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))?;

        if model.status != WithdrawalStatus::Pending.as_str() {
            return Err(
                AppError::AlreadyProcessed(format!("Withdrawal is already {}", model.status))
            );
        }

        let mut active: withdrawal::ActiveModel = model.into();
        active.status = Set(WithdrawalStatus::Completed.to_string());
        active.processed_by = Set(Some(admin_id));
        active.processed_at = Set(Some(self.clock.now()));
        active.admin_notes = Set(notes);
        active.updated_at = Set(self.clock.now());
        let updated = active.update(&txn).await?;

        // Balance was already debited at creation; settlement only flips
        // statuses.
        self.wallet.update_transaction_status(
            &txn,
            withdrawal_id,
            TxKind::Withdrawal,
            TxStatus::Completed
        ).await?;

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn reject_withdrawal(
        &self,
        withdrawal_id: Uuid,
        admin_id: Uuid,
        notes: String
    ) -> Result<withdrawal::Model> {
        if notes.trim().is_empty() {
            return Err(AppError::Validation("Rejection notes are required".to_string()));
        }

        let txn = self.db.begin().await?;

        let model = Withdrawal::find_by_id(withdrawal_id)
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("Withdrawal not found".to_string()))?;

        if model.status != WithdrawalStatus::Pending.as_str() {
            return Err(
                AppError::AlreadyProcessed(format!("Withdrawal is already {}", model.status))
            );
        }

        let user_id = model.user_id;
        let amount = model.amount;

        // Release the hold: refund the gross amount and reverse the
        // total_withdrawn counter.
        self.wallet.credit(&txn, user_id, amount).await?;
        self.wallet.record_stat(&txn, user_id, WalletStat::TotalWithdrawn, -amount).await?;

        let mut active: withdrawal::ActiveModel = model.into();
        active.status = Set(WithdrawalStatus::Rejected.to_string());
        active.processed_by = Set(Some(admin_id));
        active.processed_at = Set(Some(self.clock.now()));
        active.admin_notes = Set(Some(notes));
        active.updated_at = Set(self.clock.now());
        let updated = active.update(&txn).await?;

        self.wallet.update_transaction_status(
            &txn,
            withdrawal_id,
            TxKind::Withdrawal,
            TxStatus::Rejected
        ).await?;

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn user_withdrawals(
        &self,
        user_id: Uuid,
        limit: u64
    ) -> Result<Vec<withdrawal::Model>> {
        let withdrawals = Withdrawal::find()
            .filter(withdrawal::Column::UserId.eq(user_id))
            .order_by_desc(withdrawal::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref()).await?;

        Ok(withdrawals)
    }

    pub async fn withdrawals_by_status(
        &self,
        status: Option<WithdrawalStatus>,
        limit: u64
    ) -> Result<Vec<withdrawal::Model>> {
        let mut query = Withdrawal::find();

        if let Some(status) = status {
            query = query.filter(withdrawal::Column::Status.eq(status.as_str()));
        }

        let withdrawals = query
            .order_by_desc(withdrawal::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref()).await?;

        Ok(withdrawals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{ DateTime, Utc };
    use rust_decimal_macros::dec;
    use sea_orm::{ DatabaseBackend, MockDatabase, MockExecResult };

    fn service(db: DatabaseConnection) -> WithdrawalService {
        let clock: Arc<FixedClock> = Arc::new(
            FixedClock::new("2025-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        WithdrawalService::new(
            Arc::new(db),
            PlatformConfig::default(),
            WalletService::new(clock.clone()),
            clock
        )
    }

    fn count_row(count: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        let mut row = std::collections::BTreeMap::new();
        row.insert("num_items", sea_orm::Value::BigInt(Some(count)));
        row
    }

    fn request(amount: Decimal) -> CreateWithdrawalRequest {
        CreateWithdrawalRequest {
            amount,
            bank_id: Uuid::new_v4(),
            account_number: "0001234567".to_string(),
            account_holder_name: "Test Holder".to_string(),
        }
    }

    fn pending_withdrawal(user_id: Uuid) -> withdrawal::Model {
        let now = "2025-03-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let (fees, net_amount) = compute_fees(dec!(1000), dec!(0.06));
        withdrawal::Model {
            id: Uuid::new_v4(),
            user_id,
            amount: dec!(1000),
            fees,
            net_amount,
            bank_id: Uuid::new_v4(),
            account_number: "0001234567".to_string(),
            account_holder_name: "Test Holder".to_string(),
            status: WithdrawalStatus::Pending.to_string(),
            processed_by: None,
            processed_at: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fee_computation() {
        // 1000 at 6%: 60 in fees, 940 paid out
        let (fees, net) = compute_fees(dec!(1000), dec!(0.06));
        assert_eq!(fees, dec!(60));
        assert_eq!(net, dec!(940));

        let (fees, net) = compute_fees(dec!(2500), dec!(0.06));
        assert_eq!(fees, dec!(150));
        assert_eq!(net, dec!(2350));
    }

    #[tokio::test]
    async fn test_create_rejects_below_minimum() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(db)
            .create_withdrawal(Uuid::new_v4(), request(dec!(999))).await
            .unwrap_err();

        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Minimum withdrawal is 1000 FCFA"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reject_releases_the_hold() {
        let user_id = Uuid::new_v4();
        let pending = pending_withdrawal(user_id);
        let mut rejected = pending.clone();
        rejected.status = WithdrawalStatus::Rejected.to_string();

        // Script exactly the refund credit, the counter reversal and the
        // audit-status flip; an extra or missing wallet write fails here.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .append_query_results([vec![rejected]])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // credit back
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // stat reversal
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // tx status
            ])
            .into_connection();

        let updated = service(db)
            .reject_withdrawal(pending.id, Uuid::new_v4(), "Account mismatch".to_string()).await
            .unwrap();

        assert_eq!(updated.status, WithdrawalStatus::Rejected.as_str());
    }

    #[tokio::test]
    async fn test_daily_limit_counts_pending_and_completed() {
        let user_id = Uuid::new_v4();

        // Three outstanding withdrawals today already: the fourth attempt
        // must fail before any balance check.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![count_row(3)]])
            .into_connection();

        let err = service(db)
            .create_withdrawal(user_id, request(dec!(1000))).await
            .unwrap_err();

        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Maximum 3 withdrawals per day"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
