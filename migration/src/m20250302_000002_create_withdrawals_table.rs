use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Withdrawal::Table)
                .if_not_exists()
                .col(ColumnDef::new(Withdrawal::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Withdrawal::UserId).uuid().not_null())
                .col(ColumnDef::new(Withdrawal::Amount).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(Withdrawal::Fees).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(Withdrawal::NetAmount).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(Withdrawal::BankId).uuid().not_null())
                .col(ColumnDef::new(Withdrawal::AccountNumber).string().not_null())
                .col(ColumnDef::new(Withdrawal::AccountHolderName).string().not_null())
                .col(ColumnDef::new(Withdrawal::Status).string().not_null())
                .col(ColumnDef::new(Withdrawal::ProcessedBy).uuid().null())
                .col(ColumnDef::new(Withdrawal::ProcessedAt).timestamp_with_time_zone().null())
                .col(ColumnDef::new(Withdrawal::AdminNotes).text().null())
                .col(
                    ColumnDef::new(Withdrawal::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(Withdrawal::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        // Daily limit check scans by user and creation time
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_withdrawals_user_created")
                .table(Withdrawal::Table)
                .col(Withdrawal::UserId)
                .col(Withdrawal::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Withdrawal::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Withdrawal {
    #[sea_orm(iden = "withdrawals")]
    Table,
    Id,
    UserId,
    Amount,
    Fees,
    NetAmount,
    BankId,
    AccountNumber,
    AccountHolderName,
    Status,
    ProcessedBy,
    ProcessedAt,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}
