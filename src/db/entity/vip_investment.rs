use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// A purchased position. `daily_return_amount` is frozen at purchase
/// time so later catalog rate changes never affect running positions.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vip_investments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub vip_level: i32,
    pub amount: Decimal,
    pub daily_return_amount: Decimal,
    pub purchase_time: DateTimeUtc,
    /// Anchored to purchase time, not wall-clock midnight: earnings land
    /// exactly 24h after purchase and every 24h thereafter.
    pub next_earning_time: DateTimeUtc,
    pub start_date: DateTimeUtc,
    pub end_date: DateTimeUtc,
    pub days_elapsed: i32,
    pub total_earned: Decimal,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
