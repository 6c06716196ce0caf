pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_wallets_table;
mod m20250301_000003_create_transactions_table;
mod m20250301_000004_create_banks_table;
mod m20250301_000005_create_vip_products_table;
mod m20250302_000001_create_deposits_table;
mod m20250302_000002_create_withdrawals_table;
mod m20250303_000001_create_vip_investments_table;
mod m20250303_000002_create_daily_earnings_table;
mod m20250303_000003_create_referral_commissions_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_wallets_table::Migration),
            Box::new(m20250301_000003_create_transactions_table::Migration),
            Box::new(m20250301_000004_create_banks_table::Migration),
            Box::new(m20250301_000005_create_vip_products_table::Migration),
            Box::new(m20250302_000001_create_deposits_table::Migration),
            Box::new(m20250302_000002_create_withdrawals_table::Migration),
            Box::new(m20250303_000001_create_vip_investments_table::Migration),
            Box::new(m20250303_000002_create_daily_earnings_table::Migration),
            Box::new(m20250303_000003_create_referral_commissions_table::Migration)
        ]
    }
}
