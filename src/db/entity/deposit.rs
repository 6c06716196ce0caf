use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// A request to add funds. The wallet is credited only on approval,
/// never at creation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub payment_method: String,
    pub account_number: String,
    /// Computed at creation: true iff the user had no prior deposit in
    /// pending or approved state. The sole referral trigger.
    pub is_first_deposit: bool,
    pub status: String,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTimeUtc>,
    pub admin_notes: Option<String>,
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
