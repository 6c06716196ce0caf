use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(VipInvestment::Table)
                .if_not_exists()
                .col(ColumnDef::new(VipInvestment::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(VipInvestment::UserId).uuid().not_null())
                .col(ColumnDef::new(VipInvestment::VipLevel).integer().not_null())
                .col(ColumnDef::new(VipInvestment::Amount).decimal_len(18, 2).not_null())
                .col(
                    ColumnDef::new(VipInvestment::DailyReturnAmount)
                        .decimal_len(18, 2)
                        .not_null()
                )
                .col(
                    ColumnDef::new(VipInvestment::PurchaseTime)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .col(
                    ColumnDef::new(VipInvestment::NextEarningTime)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .col(ColumnDef::new(VipInvestment::StartDate).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(VipInvestment::EndDate).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(VipInvestment::DaysElapsed).integer().not_null().default(0))
                .col(
                    ColumnDef::new(VipInvestment::TotalEarned)
                        .decimal_len(18, 2)
                        .not_null()
                        .default(0)
                )
                .col(ColumnDef::new(VipInvestment::Status).string().not_null())
                .col(
                    ColumnDef::new(VipInvestment::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(VipInvestment::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        // The earnings tick selects by status and due time
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_vip_investments_status_next_earning")
                .table(VipInvestment::Table)
                .col(VipInvestment::Status)
                .col(VipInvestment::NextEarningTime)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_vip_investments_user")
                .table(VipInvestment::Table)
                .col(VipInvestment::UserId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(VipInvestment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum VipInvestment {
    #[sea_orm(iden = "vip_investments")]
    Table,
    Id,
    UserId,
    VipLevel,
    Amount,
    DailyReturnAmount,
    PurchaseTime,
    NextEarningTime,
    StartDate,
    EndDate,
    DaysElapsed,
    TotalEarned,
    Status,
    CreatedAt,
    UpdatedAt,
}
