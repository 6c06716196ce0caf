use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(VipProduct::Table)
                .if_not_exists()
                .col(ColumnDef::new(VipProduct::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(VipProduct::Level).integer().not_null())
                .col(ColumnDef::new(VipProduct::Name).string().not_null())
                .col(ColumnDef::new(VipProduct::MinAmount).decimal_len(18, 2).not_null())
                .col(ColumnDef::new(VipProduct::DailyReturn).decimal_len(8, 4).not_null())
                .col(ColumnDef::new(VipProduct::DurationDays).integer().not_null())
                .col(ColumnDef::new(VipProduct::IsActive).boolean().not_null().default(true))
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_vip_products_level")
                .table(VipProduct::Table)
                .col(VipProduct::Level)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(VipProduct::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum VipProduct {
    #[sea_orm(iden = "vip_products")]
    Table,
    Id,
    Level,
    Name,
    MinAmount,
    DailyReturn,
    DurationDays,
    IsActive,
}
