use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Immutable record of one accrual event. Unique per
/// (investment_id, earning_date); the scheduler's idempotency guard.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_earnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub investment_id: Uuid,
    pub amount: Decimal,
    pub earning_date: Date,
    pub earning_time: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vip_investment::Entity",
        from = "Column::InvestmentId",
        to = "super::vip_investment::Column::Id"
    )]
    Investment,
}

impl Related<super::vip_investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
