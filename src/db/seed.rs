use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

use crate::db::entity::{bank, vip_product, Bank, VipProduct};
use crate::error::Result;

/// Insert the VIP catalog and bank list on first boot. Skips any table
/// that already has rows so reruns are harmless.
pub async fn seed_reference_data(db: &DatabaseConnection) -> Result<()> {
    if VipProduct::find().count(db).await? == 0 {
        let products = VIP_CATALOG
            .iter()
            .map(|(level, name, min_amount, daily_return, duration)| {
                vip_product::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    level: Set(*level),
                    name: Set(name.to_string()),
                    min_amount: Set(*min_amount),
                    daily_return: Set(*daily_return),
                    duration_days: Set(*duration),
                    is_active: Set(true),
                }
            })
            .collect::<Vec<_>>();

        VipProduct::insert_many(products).exec(db).await?;
        tracing::info!("Seeded {} VIP products", VIP_CATALOG.len());
    }

    if Bank::find().count(db).await? == 0 {
        let banks = BANKS
            .iter()
            .map(|(name, code, country)| bank::ActiveModel {
                id: Set(Uuid::new_v4()),
                name: Set(name.to_string()),
                code: Set(code.to_string()),
                country_code: Set(country.to_string()),
                is_active: Set(true),
            })
            .collect::<Vec<_>>();

        Bank::insert_many(banks).exec(db).await?;
        tracing::info!("Seeded {} banks", BANKS.len());
    }

    Ok(())
}

/// (level, name, min amount FCFA, daily return, duration days)
const VIP_CATALOG: &[(i32, &str, Decimal, Decimal, i32)] = &[
    (1, "VIP Bronze", dec!(3000), dec!(0.10), 90),
    (2, "VIP Silver", dec!(10000), dec!(0.10), 90),
    (3, "VIP Gold", dec!(25000), dec!(0.10), 90),
    (4, "VIP Platinum", dec!(50000), dec!(0.10), 90),
    (5, "VIP Diamond", dec!(100000), dec!(0.10), 90),
    (6, "VIP Elite", dec!(250000), dec!(0.10), 90),
    (7, "VIP Master", dec!(500000), dec!(0.10), 90),
    (8, "VIP Legend", dec!(1000000), dec!(0.10), 90),
    (9, "VIP Supreme", dec!(2000000), dec!(0.10), 90),
    (10, "VIP Ultimate", dec!(5000000), dec!(0.10), 90),
];

const BANKS: &[(&str, &str, &str)] = &[
    ("Ecobank", "ECO", "TG"),
    ("Orabank", "ORA", "TG"),
    ("UBA", "UBA", "BJ"),
    ("Société Ivoirienne de Banque", "SIB", "CI"),
    ("Coris Bank", "CBI", "BF"),
    ("BGFIBank", "BGF", "CG"),
];
