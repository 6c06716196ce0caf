use std::sync::Arc;

pub mod admin;
pub mod auth;
pub mod deposit;
pub mod referral;
pub mod vip;
pub mod wallet;
pub mod withdrawal;

use sea_orm::DatabaseConnection;

use crate::services::{
    DepositService,
    ReferralService,
    UserService,
    VipService,
    WalletService,
    WithdrawalService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub user_service: Arc<UserService>,
    pub wallet_service: Arc<WalletService>,
    pub deposit_service: Arc<DepositService>,
    pub withdrawal_service: Arc<WithdrawalService>,
    pub vip_service: Arc<VipService>,
    pub referral_service: Arc<ReferralService>,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        user_service: Arc<UserService>,
        wallet_service: Arc<WalletService>,
        deposit_service: Arc<DepositService>,
        withdrawal_service: Arc<WithdrawalService>,
        vip_service: Arc<VipService>,
        referral_service: Arc<ReferralService>
    ) -> Self {
        Self {
            db,
            user_service,
            wallet_service,
            deposit_service,
            withdrawal_service,
            vip_service,
            referral_service,
        }
    }
}
