use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
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
use crate::db::entity::{ transaction, wallet, Transaction, Wallet };
use crate::enums::{ TxKind, TxStatus };
use crate::error::{ AppError, Result };

/// Informational wallet counter. Never used to derive balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletStat {
    TotalInvested,
    TotalEarned,
    TotalWithdrawn,
}

impl WalletStat {
    fn column(&self) -> wallet::Column {
        match self {
            WalletStat::TotalInvested => wallet::Column::TotalInvested,
            WalletStat::TotalEarned => wallet::Column::TotalEarned,
            WalletStat::TotalWithdrawn => wallet::Column::TotalWithdrawn,
        }
    }
}

/// The ledger: every balance mutation on the platform goes through
/// `credit`/`debit` here. Methods are generic over the connection so
/// callers can compose them inside one database transaction; the
/// conditional UPDATE serializes concurrent mutations on the wallet row.
#[derive(Clone)]
pub struct WalletService {
    clock: Arc<dyn Clock>,
}

impl WalletService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub async fn create_for_user<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid
    ) -> Result<wallet::Model> {
        let now = self.clock.now();

        let model = wallet::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            balance: Set(Decimal::ZERO),
            total_invested: Set(Decimal::ZERO),
            total_earned: Set(Decimal::ZERO),
            total_withdrawn: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(conn).await?;
        Ok(model)
    }

    pub async fn get<C: ConnectionTrait>(&self, conn: &C, user_id: Uuid) -> Result<wallet::Model> {
        Wallet::find()
            .filter(wallet::Column::UserId.eq(user_id))
            .one(conn).await?
            .ok_or_else(|| AppError::NotFound("Wallet not found".to_string()))
    }

    /// Add `amount` to the spendable balance.
    pub async fn credit<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        amount: Decimal
    ) -> Result<()> {
        ensure_positive(amount)?;

        let result = Wallet::update_many()
            .col_expr(wallet::Column::Balance, Expr::col(wallet::Column::Balance).add(amount))
            .col_expr(wallet::Column::UpdatedAt, Expr::value(self.clock.now()))
            .filter(wallet::Column::UserId.eq(user_id))
            .exec(conn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Wallet not found".to_string()));
        }

        Ok(())
    }

    /// Remove `amount` from the spendable balance. The balance guard is
    /// part of the UPDATE itself, so a debit that would overdraw never
    /// applies, even under concurrent mutation.
    pub async fn debit<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        amount: Decimal
    ) -> Result<()> {
        ensure_positive(amount)?;

        let result = Wallet::update_many()
            .col_expr(wallet::Column::Balance, Expr::col(wallet::Column::Balance).sub(amount))
            .col_expr(wallet::Column::UpdatedAt, Expr::value(self.clock.now()))
            .filter(wallet::Column::UserId.eq(user_id))
            .filter(wallet::Column::Balance.gte(amount))
            .exec(conn).await?;

        if result.rows_affected == 0 {
            // Either no wallet or not enough balance; look to tell apart.
            self.get(conn, user_id).await?;
            return Err(AppError::InsufficientFunds);
        }

        Ok(())
    }

    /// Adjust one informational counter. Negative deltas are allowed
    /// (withdrawal rejection reverses total_withdrawn).
    pub async fn record_stat<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        stat: WalletStat,
        delta: Decimal
    ) -> Result<()> {
        let column = stat.column();

        let result = Wallet::update_many()
            .col_expr(column, Expr::col(column).add(delta))
            .col_expr(wallet::Column::UpdatedAt, Expr::value(self.clock.now()))
            .filter(wallet::Column::UserId.eq(user_id))
            .exec(conn).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Wallet not found".to_string()));
        }

        Ok(())
    }

    /// Append an audit entry. Callers pair one with every credit/debit.
    pub async fn add_transaction<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        kind: TxKind,
        amount: Decimal,
        description: &str,
        reference_id: Option<Uuid>,
        status: TxStatus
    ) -> Result<transaction::Model> {
        let model = transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            kind: Set(kind.to_string()),
            amount: Set(amount),
            description: Set(description.to_string()),
            reference_id: Set(reference_id),
            status: Set(status.to_string()),
            created_at: Set(self.clock.now()),
        };

        let model = model.insert(conn).await?;
        Ok(model)
    }

    /// Move the audit entry for a workflow (deposit/withdrawal id) to its
    /// settled status. Amount, kind and description never change.
    pub async fn update_transaction_status<C: ConnectionTrait>(
        &self,
        conn: &C,
        reference_id: Uuid,
        kind: TxKind,
        status: TxStatus
    ) -> Result<()> {
        Transaction::update_many()
            .col_expr(transaction::Column::Status, Expr::value(status.as_str()))
            .filter(transaction::Column::ReferenceId.eq(reference_id))
            .filter(transaction::Column::Kind.eq(kind.as_str()))
            .exec(conn).await?;

        Ok(())
    }

    pub async fn transactions<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        limit: u64
    ) -> Result<Vec<transaction::Model>> {
        let transactions = Transaction::find()
            .filter(transaction::Column::UserId.eq(user_id))
            .order_by_desc(transaction::Column::CreatedAt)
            .limit(limit)
            .all(conn).await?;

        Ok(transactions)
    }
}

fn ensure_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation("Amount must be positive".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{ DateTime, Utc };
    use rust_decimal_macros::dec;
    use sea_orm::{ DatabaseBackend, MockDatabase, MockExecResult };

    fn test_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new("2025-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap()))
    }

    fn wallet_with_balance(user_id: Uuid, balance: Decimal) -> wallet::Model {
        let now = "2025-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        wallet::Model {
            id: Uuid::new_v4(),
            user_id,
            balance,
            total_invested: Decimal::ZERO,
            total_earned: Decimal::ZERO,
            total_withdrawn: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_credit_applies_once() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .into_connection();

        let service = WalletService::new(test_clock());
        service.credit(&db, Uuid::new_v4(), dec!(3000)).await.unwrap();
    }

    #[tokio::test]
    async fn test_credit_rejects_non_positive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = WalletService::new(test_clock());

        let err = service.credit(&db, Uuid::new_v4(), Decimal::ZERO).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service.debit(&db, Uuid::new_v4(), dec!(-50)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_debit_fails_without_balance() {
        let user_id = Uuid::new_v4();

        // The guarded UPDATE matches no row, then the wallet lookup shows
        // the wallet exists: the debit must fail as insufficient funds and
        // leave the balance untouched.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .append_query_results([vec![wallet_with_balance(user_id, dec!(100))]])
            .into_connection();

        let service = WalletService::new(test_clock());
        let err = service.debit(&db, user_id, dec!(500)).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds));
    }

    #[tokio::test]
    async fn test_debit_missing_wallet_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .append_query_results([Vec::<wallet::Model>::new()])
            .into_connection();

        let service = WalletService::new(test_clock());
        let err = service.debit(&db, Uuid::new_v4(), dec!(500)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
