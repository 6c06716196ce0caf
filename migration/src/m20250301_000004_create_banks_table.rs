use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(Bank::Table)
                .if_not_exists()
                .col(ColumnDef::new(Bank::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Bank::Name).string().not_null())
                .col(ColumnDef::new(Bank::Code).string().not_null())
                .col(ColumnDef::new(Bank::CountryCode).string().not_null())
                .col(ColumnDef::new(Bank::IsActive).boolean().not_null().default(true))
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_banks_code")
                .table(Bank::Table)
                .col(Bank::Code)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Bank::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Bank {
    #[sea_orm(iden = "banks")]
    Table,
    Id,
    Name,
    Code,
    CountryCode,
    IsActive,
}
