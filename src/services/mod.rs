pub mod deposit_service;
pub mod referral_service;
pub mod user_service;
pub mod vip_service;
pub mod wallet_service;
pub mod withdrawal_service;

pub use deposit_service::DepositService;
pub use referral_service::ReferralService;
pub use user_service::UserService;
pub use vip_service::VipService;
pub use wallet_service::WalletService;
pub use withdrawal_service::WithdrawalService;
