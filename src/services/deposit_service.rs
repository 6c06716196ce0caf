use std::sync::Arc;

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
use crate::config::PlatformConfig;
use crate::db::entity::{ deposit, Deposit, User };
use crate::enums::{ DepositStatus, TxKind, TxStatus };
use crate::error::{ AppError, Result };
use crate::services::referral_service::ReferralService;
use crate::services::wallet_service::WalletService;

#[derive(Debug, Clone)]
pub struct CreateDepositRequest {
    pub amount: Decimal,
    pub payment_method: String,
    pub account_number: String,
}

/// Deposit requests and their admin settlement. The wallet is credited
/// on approval only; approval of a first deposit is the single trigger
/// for referral commission processing.
#[derive(Clone)]
pub struct DepositService {
    db: Arc<DatabaseConnection>,
    platform: PlatformConfig,
    wallet: WalletService,
    referral: ReferralService,
    clock: Arc<dyn Clock>,
}

impl DepositService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        platform: PlatformConfig,
        wallet: WalletService,
        referral: ReferralService,
        clock: Arc<dyn Clock>
    ) -> Self {
        Self { db, platform, wallet, referral, clock }
    }

    pub async fn create_deposit(
        &self,
        user_id: Uuid,
        request: CreateDepositRequest
    ) -> Result<deposit::Model> {
        if request.amount < self.platform.min_deposit {
            return Err(
                AppError::Validation(
                    format!("Minimum deposit is {} FCFA", self.platform.min_deposit)
                )
            );
        }

        let txn = self.db.begin().await?;

        // Lock the user row so two concurrent deposits cannot both read
        // an empty history and both come out flagged first.
        User::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        // First deposit iff the user has no prior deposit still pending
        // or already approved. Rejected deposits do not count.
        let prior = Deposit::find()
            .filter(deposit::Column::UserId.eq(user_id))
            .filter(
                deposit::Column::Status.is_in([
                    DepositStatus::Pending.as_str(),
                    DepositStatus::Approved.as_str(),
                ])
            )
            .limit(1)
            .all(&txn).await?;
        let is_first_deposit = prior.is_empty();

        let now = self.clock.now();
        let model = deposit::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount: Set(request.amount),
            payment_method: Set(request.payment_method.clone()),
            account_number: Set(request.account_number),
            is_first_deposit: Set(is_first_deposit),
            status: Set(DepositStatus::Pending.to_string()),
            processed_by: Set(None),
            processed_at: Set(None),
            admin_notes: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let model = model.insert(&txn).await?;

        // Audit entry only; no balance effect until approval.
        self.wallet.add_transaction(
            &txn,
            user_id,
            TxKind::Deposit,
            model.amount,
            &format!("Deposit request - {}", request.payment_method),
            Some(model.id),
            TxStatus::Pending
        ).await?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn approve_deposit(
        &self,
        deposit_id: Uuid,
        admin_id: Uuid,
        notes: Option<String>
    ) -> Result<deposit::Model> {
        let txn = self.db.begin().await?;

        let model = Deposit::find_by_id(deposit_id)
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("Deposit not found".to_string()))?;

        if model.status != DepositStatus::Pending.as_str() {
            return Err(AppError::AlreadyProcessed(format!("Deposit is already {}", model.status)));
        }

        let user_id = model.user_id;
        let amount = model.amount;
        let is_first_deposit = model.is_first_deposit;

        let mut active: deposit::ActiveModel = model.into();
        active.status = Set(DepositStatus::Approved.to_string());
        active.processed_by = Set(Some(admin_id));
        active.processed_at = Set(Some(self.clock.now()));
        active.admin_notes = Set(notes);
        active.updated_at = Set(self.clock.now());
        let updated = active.update(&txn).await?;

        self.wallet.credit(&txn, user_id, amount).await?;
        self.wallet.update_transaction_status(
            &txn,
            deposit_id,
            TxKind::Deposit,
            TxStatus::Completed
        ).await?;

        if is_first_deposit {
            self.referral.process_referral_commissions(&txn, user_id, deposit_id, amount).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn reject_deposit(
        &self,
        deposit_id: Uuid,
        admin_id: Uuid,
        notes: String
    ) -> Result<deposit::Model> {
        if notes.trim().is_empty() {
            return Err(AppError::Validation("Rejection notes are required".to_string()));
        }

        let txn = self.db.begin().await?;

        let model = Deposit::find_by_id(deposit_id)
            .one(&txn).await?
            .ok_or_else(|| AppError::NotFound("Deposit not found".to_string()))?;

        if model.status != DepositStatus::Pending.as_str() {
            return Err(AppError::AlreadyProcessed(format!("Deposit is already {}", model.status)));
        }

        let mut active: deposit::ActiveModel = model.into();
        active.status = Set(DepositStatus::Rejected.to_string());
        active.processed_by = Set(Some(admin_id));
        active.processed_at = Set(Some(self.clock.now()));
        active.admin_notes = Set(Some(notes));
        active.updated_at = Set(self.clock.now());
        let updated = active.update(&txn).await?;

        // No balance to reverse; nothing was credited while pending.
        self.wallet.update_transaction_status(
            &txn,
            deposit_id,
            TxKind::Deposit,
            TxStatus::Rejected
        ).await?;

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn user_deposits(&self, user_id: Uuid, limit: u64) -> Result<Vec<deposit::Model>> {
        let deposits = Deposit::find()
            .filter(deposit::Column::UserId.eq(user_id))
            .order_by_desc(deposit::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref()).await?;

        Ok(deposits)
    }

    pub async fn deposits_by_status(
        &self,
        status: Option<DepositStatus>,
        limit: u64
    ) -> Result<Vec<deposit::Model>> {
        let mut query = Deposit::find();

        if let Some(status) = status {
            query = query.filter(deposit::Column::Status.eq(status.as_str()));
        }

        let deposits = query
            .order_by_desc(deposit::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref()).await?;

        Ok(deposits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{ DateTime, Utc };
    use rust_decimal_macros::dec;
    use sea_orm::{ DatabaseBackend, MockDatabase, MockExecResult };

    fn service(db: DatabaseConnection) -> DepositService {
        let clock: Arc<FixedClock> = Arc::new(
            FixedClock::new("2025-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        let wallet = WalletService::new(clock.clone());
        let referral = ReferralService::new(
            PlatformConfig::default(),
            wallet.clone(),
            clock.clone()
        );
        DepositService::new(Arc::new(db), PlatformConfig::default(), wallet, referral, clock)
    }

    fn pending_deposit(id: Uuid, status: DepositStatus) -> deposit::Model {
        let now = "2025-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        deposit::Model {
            id,
            user_id: Uuid::new_v4(),
            amount: dec!(3000),
            payment_method: "Mobile Money".to_string(),
            account_number: "90000000".to_string(),
            is_first_deposit: true,
            status: status.to_string(),
            processed_by: None,
            processed_at: None,
            admin_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_below_minimum() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = service(db);

        let err = service
            .create_deposit(Uuid::new_v4(), CreateDepositRequest {
                amount: dec!(2999),
                payment_method: "Mobile Money".to_string(),
                account_number: "90000000".to_string(),
            }).await
            .unwrap_err();

        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Minimum deposit is 3000 FCFA"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_requires_existing_user() {
        // The locked user lookup misses: no deposit row is written (the
        // mock has no further results, so any insert would fail loudly).
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<crate::db::entity::user::Model>::new()])
            .into_connection();

        let err = service(db)
            .create_deposit(Uuid::new_v4(), CreateDepositRequest {
                amount: dec!(3000),
                payment_method: "Mobile Money".to_string(),
                account_number: "90000000".to_string(),
            }).await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_approve_credits_wallet_once() {
        // First deposit, no referrer: approval credits the wallet and
        // completes the audit row, and no commission is written. The
        // exec script allows exactly the credit and the status flip.
        let deposit_id = Uuid::new_v4();
        let pending = pending_deposit(deposit_id, DepositStatus::Pending);
        let mut approved = pending.clone();
        approved.status = DepositStatus::Approved.to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending]])
            .append_query_results([vec![approved]])
            .append_query_results([Vec::<crate::db::entity::user::Model>::new()]) // no referrer
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // wallet credit
                MockExecResult { last_insert_id: 0, rows_affected: 1 }, // tx status
            ])
            .into_connection();

        let updated = service(db)
            .approve_deposit(deposit_id, Uuid::new_v4(), None).await
            .unwrap();

        assert_eq!(updated.status, DepositStatus::Approved.as_str());
    }

    #[tokio::test]
    async fn test_approve_refuses_processed_deposit() {
        let deposit_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending_deposit(deposit_id, DepositStatus::Approved)]])
            .into_connection();

        let err = service(db)
            .approve_deposit(deposit_id, Uuid::new_v4(), None).await
            .unwrap_err();

        match err {
            AppError::AlreadyProcessed(msg) => assert_eq!(msg, "Deposit is already approved"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reject_requires_notes() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(db)
            .reject_deposit(Uuid::new_v4(), Uuid::new_v4(), "   ".to_string()).await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_deposit_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<deposit::Model>::new()])
            .into_connection();

        let err = service(db)
            .approve_deposit(Uuid::new_v4(), Uuid::new_v4(), None).await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }
}
