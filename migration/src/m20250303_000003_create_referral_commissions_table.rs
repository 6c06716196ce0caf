use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(ReferralCommission::Table)
                .if_not_exists()
                .col(ColumnDef::new(ReferralCommission::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(ReferralCommission::ReferrerId).uuid().not_null())
                .col(ColumnDef::new(ReferralCommission::ReferredId).uuid().not_null())
                .col(ColumnDef::new(ReferralCommission::DepositId).uuid().not_null())
                .col(ColumnDef::new(ReferralCommission::Level).integer().not_null())
                .col(ColumnDef::new(ReferralCommission::Rate).decimal_len(8, 4).not_null())
                .col(ColumnDef::new(ReferralCommission::Amount).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(ReferralCommission::Status).string().not_null())
                .col(
                    ColumnDef::new(ReferralCommission::PaidAt)
                        .timestamp_with_time_zone()
                        .null()
                )
                .col(
                    ColumnDef::new(ReferralCommission::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_referral_commissions_referrer")
                .table(ReferralCommission::Table)
                .col(ReferralCommission::ReferrerId)
                .to_owned()
        ).await?;

        // One commission per deposit per level
        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_referral_commissions_deposit_level")
                .table(ReferralCommission::Table)
                .col(ReferralCommission::DepositId)
                .col(ReferralCommission::Level)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ReferralCommission::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ReferralCommission {
    #[sea_orm(iden = "referral_commissions")]
    Table,
    Id,
    ReferrerId,
    ReferredId,
    DepositId,
    Level,
    Rate,
    Amount,
    Status,
    PaidAt,
    CreatedAt,
}
