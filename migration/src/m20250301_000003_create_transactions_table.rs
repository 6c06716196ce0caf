use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Transaction::Table)
                .if_not_exists()
                .col(ColumnDef::new(Transaction::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Transaction::UserId).uuid().not_null())
                .col(ColumnDef::new(Transaction::Kind).string().not_null())
                .col(ColumnDef::new(Transaction::Amount).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(Transaction::Description).string().not_null())
                .col(ColumnDef::new(Transaction::ReferenceId).uuid().null())
                .col(ColumnDef::new(Transaction::Status).string().not_null())
                .col(
                    ColumnDef::new(Transaction::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_transactions_user_created")
                .table(Transaction::Table)
                .col(Transaction::UserId)
                .col(Transaction::CreatedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_transactions_reference")
                .table(Transaction::Table)
                .col(Transaction::ReferenceId)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transaction::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transaction {
    #[sea_orm(iden = "transactions")]
    Table,
    Id,
    UserId,
    Kind,
    Amount,
    Description,
    ReferenceId,
    Status,
    CreatedAt,
}
