use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(DailyEarning::Table)
                .if_not_exists()
                .col(ColumnDef::new(DailyEarning::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(DailyEarning::UserId).uuid().not_null())
                .col(ColumnDef::new(DailyEarning::InvestmentId).uuid().not_null())
                .col(ColumnDef::new(DailyEarning::Amount).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(DailyEarning::EarningDate).date().not_null())
                .col(
                    ColumnDef::new(DailyEarning::EarningTime)
                        .timestamp_with_time_zone()
                        .not_null()
                )
                .to_owned()
        ).await?;

        // At most one earning per investment per calendar date
        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_daily_earnings_investment_date")
                .table(DailyEarning::Table)
                .col(DailyEarning::InvestmentId)
                .col(DailyEarning::EarningDate)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_daily_earnings_user")
                .table(DailyEarning::Table)
                .col(DailyEarning::UserId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(DailyEarning::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum DailyEarning {
    #[sea_orm(iden = "daily_earnings")]
    Table,
    Id,
    UserId,
    InvestmentId,
    Amount,
    EarningDate,
    EarningTime,
}
