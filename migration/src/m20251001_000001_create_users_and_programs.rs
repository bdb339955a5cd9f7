use sea_orm_migration::prelude::*;

/// Users (provisioned from the identity provider's token subject)
#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

/// Programs (events owned by an organizer)
#[derive(DeriveIden)]
pub(crate) enum Programs {
    Table,
    Id,
    OrganizerId,
    Name,
    Venue,
    StartTime,
    EndTime,
    RegistrationStart,
    RegistrationEnd,
    Status,
    CreatedAt,
    UpdatedAt,
}

/// Pass types (ticket tiers of a program)
#[derive(DeriveIden)]
pub(crate) enum PassTypes {
    Table,
    Id,
    ProgramId,
    Name,
    PriceCents,
    Description,
    TotalAvailable,
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
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Programs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Programs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Programs::OrganizerId).uuid().not_null())
                    .col(ColumnDef::new(Programs::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Programs::Venue).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Programs::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Programs::EndTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Programs::RegistrationStart)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Programs::RegistrationEnd)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // DRAFT / PUBLISHED / COMPLETED
                    .col(ColumnDef::new(Programs::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Programs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Programs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_programs_organizer")
                            .from(Programs::Table, Programs::OrganizerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_programs_organizer")
                    .table(Programs::Table)
                    .col(Programs::OrganizerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_programs_status")
                    .table(Programs::Table)
                    .col(Programs::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PassTypes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PassTypes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(PassTypes::ProgramId).uuid().not_null())
                    .col(ColumnDef::new(PassTypes::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(PassTypes::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PassTypes::Description).text().null())
                    // NULL = unlimited
                    .col(ColumnDef::new(PassTypes::TotalAvailable).integer().null())
                    .col(
                        ColumnDef::new(PassTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PassTypes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pass_types_program")
                            .from(PassTypes::Table, PassTypes::ProgramId)
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
                    .name("idx_pass_types_program")
                    .table(PassTypes::Table)
                    .col(PassTypes::ProgramId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：pass_types -> programs -> users
        manager
            .drop_table(Table::drop().if_exists().table(PassTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Programs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
