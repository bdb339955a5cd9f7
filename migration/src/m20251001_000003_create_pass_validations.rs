use sea_orm_migration::prelude::*;

use super::m20251001_000001_create_users_and_programs::Programs;
use super::m20251001_000002_create_passes_and_qr_codes::Passes;

/// Pass validations (append-only door scan ledger)
#[derive(DeriveIden)]
enum PassValidations {
    Table,
    Id,
    PassId,
    ProgramId,
    Status,
    ValidationMethod,
    ValidatedBy,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PassValidations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PassValidations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PassValidations::PassId).uuid().not_null())
                    .col(ColumnDef::new(PassValidations::ProgramId).uuid().not_null())
                    // VALID / INVALID
                    .col(
                        ColumnDef::new(PassValidations::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    // QR_SCAN / MANUAL
                    .col(
                        ColumnDef::new(PassValidations::ValidationMethod)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(PassValidations::ValidatedBy).uuid().null())
                    .col(
                        ColumnDef::new(PassValidations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pass_validations_pass")
                            .from(PassValidations::Table, PassValidations::PassId)
                            .to(Passes::Table, Passes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pass_validations_program")
                            .from(PassValidations::Table, PassValidations::ProgramId)
                            .to(Programs::Table, Programs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_pass_validations_pass")
                    .table(PassValidations::Table)
                    .col(PassValidations::PassId)
                    .col(PassValidations::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PassValidations::Table)
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
