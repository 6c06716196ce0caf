use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Deposit::Table)
                .if_not_exists()
                .col(ColumnDef::new(Deposit::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Deposit::UserId).uuid().not_null())
                .col(ColumnDef::new(Deposit::Amount).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(Deposit::PaymentMethod).string().not_null())
                .col(ColumnDef::new(Deposit::AccountNumber).string().not_null())
                .col(ColumnDef::new(Deposit::IsFirstDeposit).boolean().not_null())
                .col(ColumnDef::new(Deposit::Status).string().not_null())
                .col(ColumnDef::new(Deposit::ProcessedBy).uuid().null())
                .col(ColumnDef::new(Deposit::ProcessedAt).timestamp_with_time_zone().null())
                .col(ColumnDef::new(Deposit::AdminNotes).text().null())
                .col(
                    ColumnDef::new(Deposit::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(Deposit::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_deposits_user_status")
                .table(Deposit::Table)
                .col(Deposit::UserId)
                .col(Deposit::Status)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Deposit::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Deposit {
    #[sea_orm(iden = "deposits")]
    Table,
    Id,
    UserId,
    Amount,
    PaymentMethod,
    AccountNumber,
    IsFirstDeposit,
    Status,
    ProcessedBy,
    ProcessedAt,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}
