pub mod user;
pub mod wallet;
pub mod transaction;
pub mod bank;
pub mod deposit;
pub mod withdrawal;
pub mod vip_product;
pub mod vip_investment;
pub mod daily_earning;
pub mod referral_commission;

pub use user::Entity as User;
pub use wallet::Entity as Wallet;
pub use transaction::Entity as Transaction;
pub use bank::Entity as Bank;
pub use deposit::Entity as Deposit;
pub use withdrawal::Entity as Withdrawal;
pub use vip_product::Entity as VipProduct;
pub use vip_investment::Entity as VipInvestment;
pub use daily_earning::Entity as DailyEarning;
pub use referral_commission::Entity as ReferralCommission;
