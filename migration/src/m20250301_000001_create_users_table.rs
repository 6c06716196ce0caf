use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(User::Table)
                .if_not_exists()
                .col(ColumnDef::new(User::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(User::Phone).string().not_null())
                .col(ColumnDef::new(User::CountryCode).string().not_null())
                .col(ColumnDef::new(User::FullName).string().not_null())
                .col(ColumnDef::new(User::PasswordHash).text().not_null())
                .col(ColumnDef::new(User::ReferralCode).string().not_null())
                .col(ColumnDef::new(User::ReferredBy).uuid().null())
                .col(ColumnDef::new(User::IsActive).boolean().not_null().default(true))
                .col(ColumnDef::new(User::IsAdmin).boolean().not_null().default(false))
                .col(
                    ColumnDef::new(User::CreatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .col(
                    ColumnDef::new(User::UpdatedAt)
                        .timestamp_with_time_zone()
                        .not_null()
                        .default(Expr::current_timestamp())
                )
                .to_owned()
        ).await?;

        // Phone is unique per country
        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_users_phone_country")
                .table(User::Table)
                .col(User::Phone)
                .col(User::CountryCode)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .unique()
                .name("idx_users_referral_code")
                .table(User::Table)
                .col(User::ReferralCode)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_users_referred_by")
                .table(User::Table)
                .col(User::ReferredBy)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Phone,
    CountryCode,
    FullName,
    PasswordHash,
    ReferralCode,
    ReferredBy,
    IsActive,
    IsAdmin,
    CreatedAt,
    UpdatedAt,
}
