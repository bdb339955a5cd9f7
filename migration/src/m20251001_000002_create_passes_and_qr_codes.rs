use sea_orm_migration::prelude::*;

use super::m20251001_000001_create_users_and_programs::{PassTypes, Users};

/// Passes (issued tickets)
#[derive(DeriveIden)]
pub(crate) enum Passes {
    Table,
    Id,
    PassTypeId,
    RegistrantId,
    Status,
    ManualCode,
    CreatedAt,
    UpdatedAt,
}

/// QR codes bound to a pass; the id itself is the scanned value
#[derive(DeriveIden)]
enum QrCodes {
    Table,
    Id,
    PassId,
    Status,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Passes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Passes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Passes::PassTypeId).uuid().not_null())
                    .col(ColumnDef::new(Passes::RegistrantId).uuid().not_null())
                    // ACTIVE / CANCELLED
                    .col(ColumnDef::new(Passes::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Passes::ManualCode).string_len(32).null())
                    .col(
                        ColumnDef::new(Passes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Passes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_passes_pass_type")
                            .from(Passes::Table, Passes::PassTypeId)
                            .to(PassTypes::Table, PassTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_passes_registrant")
                            .from(Passes::Table, Passes::RegistrantId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // 库存计数按 pass_type_id 统计
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_passes_pass_type")
                    .table(Passes::Table)
                    .col(Passes::PassTypeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_passes_registrant")
                    .table(Passes::Table)
                    .col(Passes::RegistrantId)
                    .to_owned(),
            )
            .await?;

        // Storage-level backstop for manual code uniqueness
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_passes_manual_code_unique")
                    .table(Passes::Table)
                    .col(Passes::ManualCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QrCodes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(QrCodes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(QrCodes::PassId).uuid().not_null())
                    // ACTIVE / REVOKED
                    .col(ColumnDef::new(QrCodes::Status).string_len(16).not_null())
                    .col(ColumnDef::new(QrCodes::Value).text().not_null())
                    .col(
                        ColumnDef::new(QrCodes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QrCodes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_qr_codes_pass")
                            .from(QrCodes::Table, QrCodes::PassId)
                            .to(Passes::Table, Passes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_qr_codes_pass")
                    .table(QrCodes::Table)
                    .col(QrCodes::PassId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(QrCodes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Passes::Table).to_owned())
            .await?;
        Ok(())
    }
}
