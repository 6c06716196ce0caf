use std::sync::Arc;

use rand::distr::{ Alphanumeric, SampleString };
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    DatabaseConnection,
    DbErr,
    EntityTrait,
    QueryFilter,
    QuerySelect,
    Set,
    SqlErr,
    TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::clock::Clock;
use crate::crypto::password::{ hash_password, verify_password };
use crate::db::entity::{ user, User };
use crate::error::{ AppError, Result };
use crate::services::wallet_service::WalletService;

const REFERRAL_CODE_LEN: usize = 8;
const MAX_REFERRAL_TREE_DEPTH: usize = 3;

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub phone: String,
    pub country_code: String,
    pub full_name: String,
    pub password: String,
    pub referral_code: Option<String>,
}

/// One downline member with the level (1..=3) at which they sit under
/// the root user.
#[derive(Debug, Serialize)]
pub struct ReferralTreeNode {
    pub user_id: Uuid,
    pub full_name: String,
    pub phone: String,
    pub level: u32,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

/// Account lifecycle: registration with referral attribution, login,
/// and admin activation toggles. Every new account gets a wallet in the
/// same transaction.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    wallet: WalletService,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, wallet: WalletService, clock: Arc<dyn Clock>) -> Self {
        Self { db, wallet, clock }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<user::Model> {
        let phone = request.phone.trim().to_string();
        if phone.len() < 8 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::Validation("Invalid phone number".to_string()));
        }
        if request.full_name.trim().is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        if request.password.len() < 6 {
            return Err(AppError::Validation("Password must be at least 6 characters".to_string()));
        }

        let existing = User::find()
            .filter(user::Column::Phone.eq(&phone))
            .filter(user::Column::CountryCode.eq(&request.country_code))
            .limit(1)
            .all(self.db.as_ref()).await?;
        if !existing.is_empty() {
            return Err(AppError::Validation("Phone number already registered".to_string()));
        }

        // Attribution is resolved at signup and never rewritten. A bad
        // code fails the signup rather than silently dropping the link.
        let referred_by = match &request.referral_code {
            Some(code) if !code.trim().is_empty() => {
                let referrer = User::find()
                    .filter(user::Column::ReferralCode.eq(code.trim().to_uppercase()))
                    .one(self.db.as_ref()).await?
                    .ok_or_else(|| {
                        AppError::InvalidReference("Invalid referral code".to_string())
                    })?;
                Some(referrer.id)
            }
            _ => None,
        };

        let referral_code = self.generate_referral_code().await?;
        let password_hash = hash_password(&request.password)?;

        let txn = self.db.begin().await?;

        let now = self.clock.now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone: Set(phone),
            country_code: Set(request.country_code),
            full_name: Set(request.full_name.trim().to_string()),
            password_hash: Set(password_hash),
            referral_code: Set(referral_code),
            referred_by: Set(referred_by),
            is_active: Set(true),
            is_admin: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        // The pre-checks above race against concurrent signups; the unique
        // indexes are the authority, so a violation here surfaces as the
        // same validation error instead of a database error.
        let model = model.insert(&txn).await.map_err(map_unique_violation)?;

        self.wallet.create_for_user(&txn, model.id).await?;

        txn.commit().await?;
        Ok(model)
    }

    pub async fn login(
        &self,
        phone: &str,
        country_code: &str,
        password: &str
    ) -> Result<user::Model> {
        let user = User::find()
            .filter(user::Column::Phone.eq(phone.trim()))
            .filter(user::Column::CountryCode.eq(country_code))
            .one(self.db.as_ref()).await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        Ok(user)
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model> {
        User::find_by_id(user_id)
            .one(self.db.as_ref()).await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn set_active(&self, user_id: Uuid, is_active: bool) -> Result<user::Model> {
        let user = self.get_user(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(self.clock.now());

        let updated = active.update(self.db.as_ref()).await?;
        Ok(updated)
    }

    /// Downline of a user as a flat list, breadth-first, at most three
    /// levels deep.
    pub async fn referral_tree(&self, user_id: Uuid) -> Result<Vec<ReferralTreeNode>> {
        let mut nodes = Vec::new();
        let mut frontier = vec![user_id];

        for level in 1..=MAX_REFERRAL_TREE_DEPTH as u32 {
            if frontier.is_empty() {
                break;
            }

            let referred = User::find()
                .filter(user::Column::ReferredBy.is_in(frontier.clone()))
                .all(self.db.as_ref()).await?;

            frontier = referred
                .iter()
                .map(|u| u.id)
                .collect();

            for u in referred {
                nodes.push(ReferralTreeNode {
                    user_id: u.id,
                    full_name: u.full_name,
                    phone: u.phone,
                    level,
                    joined_at: u.created_at,
                });
            }
        }

        Ok(nodes)
    }

    async fn generate_referral_code(&self) -> Result<String> {
        // Collisions over 36^8 codes are rare; a handful of retries is
        // plenty before declaring something wrong.
        for _ in 0..5 {
            let code = Alphanumeric.sample_string(&mut rand::rng(), REFERRAL_CODE_LEN)
                .to_uppercase();

            let taken = User::find()
                .filter(user::Column::ReferralCode.eq(&code))
                .limit(1)
                .all(self.db.as_ref()).await?;

            if taken.is_empty() {
                return Ok(code);
            }
        }

        Err(AppError::Internal("Could not allocate a referral code".to_string()))
    }
}

/// A unique-index hit on the users table means a concurrent signup won
/// the race on the same phone; report it like the pre-check would have.
fn map_unique_violation(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Validation("Phone number already registered".to_string())
        }
        _ => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{ DateTime, Utc };
    use sea_orm::{ DatabaseBackend, MockDatabase };

    fn service(db: DatabaseConnection) -> UserService {
        let clock: Arc<FixedClock> = Arc::new(
            FixedClock::new("2025-03-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
        UserService::new(Arc::new(db), WalletService::new(clock.clone()), clock)
    }

    fn user_model(id: Uuid, is_active: bool) -> user::Model {
        let now = "2025-03-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        user::Model {
            id,
            phone: "90000000".to_string(),
            country_code: "TG".to_string(),
            full_name: "Test User".to_string(),
            password_hash: crate::crypto::password::hash_password("secret1").unwrap(),
            referral_code: "ABCD1234".to_string(),
            referred_by: None,
            is_active,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn register_request(phone: &str) -> RegisterRequest {
        RegisterRequest {
            phone: phone.to_string(),
            country_code: "TG".to_string(),
            full_name: "Test User".to_string(),
            password: "secret1".to_string(),
            referral_code: None,
        }
    }

    #[tokio::test]
    async fn test_register_rejects_bad_phone() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(db)
            .register(register_request("not-a-phone")).await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_phone() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(Uuid::new_v4(), true)]])
            .into_connection();

        let err = service(db)
            .register(register_request("90000000")).await
            .unwrap_err();

        match err {
            AppError::Validation(msg) => assert_eq!(msg, "Phone number already registered"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_referral_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]) // phone free
            .append_query_results([Vec::<user::Model>::new()]) // code lookup misses
            .into_connection();

        let mut request = register_request("90000001");
        request.referral_code = Some("NOPE9999".to_string());

        let err = service(db).register(request).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidReference(_)));
    }

    #[test]
    fn test_non_unique_errors_pass_through() {
        // Only unique-index violations get translated; everything else
        // stays a database error.
        let err = map_unique_violation(DbErr::Custom("connection reset".to_string()));
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_invalid_credentials() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(Uuid::new_v4(), true)]])
            .into_connection();

        let err = service(db)
            .login("90000000", "TG", "wrong-password").await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_inactive_account_is_forbidden() {
        // Password verifies, but the account is disabled.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_model(Uuid::new_v4(), false)]])
            .into_connection();

        let err = service(db)
            .login("90000000", "TG", "secret1").await
            .unwrap_err();

        assert!(matches!(err, AppError::AccountInactive));
    }
}
