use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Catalog entry for a fixed-yield product. Admin-managed, read-only
/// to the engine.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vip_products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub level: i32,
    pub name: String,
    pub min_amount: Decimal,
    /// Fraction of principal paid out per day.
    pub daily_return: Decimal,
    pub duration_days: i32,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
