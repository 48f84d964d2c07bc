//! Initial database migration.
//!
//! Creates the user registry and the per-user collection tables. Account sets
//! and contact books are stored whole, one row per user, so saving a
//! collection is a single-row upsert.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // PART 1: USER REGISTRY
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Users::UsernameKey)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::DisplayName).string_len(128).not_null())
                    .col(ColumnDef::new(Users::CredentialHash).text().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // PART 2: PER-USER COLLECTIONS
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(AccountSets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountSets::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AccountSets::Accounts).text().not_null())
                    .col(
                        ColumnDef::new(AccountSets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ContactBooks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ContactBooks::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ContactBooks::Contacts).text().not_null())
                    .col(
                        ColumnDef::new(ContactBooks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ContactBooks::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountSets::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    UsernameKey,
    DisplayName,
    CredentialHash,
    Role,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AccountSets {
    Table,
    UserId,
    Accounts,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ContactBooks {
    Table,
    UserId,
    Contacts,
    UpdatedAt,
}
