use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Wallet::Table)
                .if_not_exists()
                .col(ColumnDef::new(Wallet::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Wallet::UserId).uuid().not_null())
                .col(
                    ColumnDef::new(Wallet::Balance)
                        .decimal_len(18, 2)
                        .not_null()
                        .default(0)
                )
                .col(
                    ColumnDef::new(Wallet::TotalInvested)
                        .decimal_len(18, 2)
                        .not_null()
                        .default(0)
                )
                .col(
                    ColumnDef::new(Wallet::TotalEarned)
                        .decimal_len(18, 2)
                        .not_null()
                        .default(0)
                )
                .col(
                    ColumnDef::new(Wallet::TotalWithdrawn)
                        .decimal_len(18, 2)
                        .not_null()
                        .default(0)
                )
                .col(
                    ColumnDef::new(Wallet::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(Wallet::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        // One wallet per user
        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_wallets_user_id")
                .table(Wallet::Table)
                .col(Wallet::UserId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Wallet::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Wallet {
    #[sea_orm(iden = "wallets")]
    Table,
    Id,
    UserId,
    Balance,
    TotalInvested,
    TotalEarned,
    TotalWithdrawn,
    CreatedAt,
    UpdatedAt,
}
