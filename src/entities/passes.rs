use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl std::fmt::Display for PassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassStatus::Active => write!(f, "ACTIVE"),
            PassStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// 票据实体（每条记录占用一个库存名额，取消后仍计数）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "passes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pass_type_id: Uuid,
    pub registrant_id: Uuid,
    pub status: PassStatus,
    #[sea_orm(unique)]
    pub manual_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pass_types::Entity",
        from = "Column::PassTypeId",
        to = "super::pass_types::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PassType,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RegistrantId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Registrant,
    #[sea_orm(has_many = "super::qr_codes::Entity")]
    QrCodes,
    #[sea_orm(has_many = "super::pass_validations::Entity")]
    PassValidations,
}

impl Related<super::pass_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PassType.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Registrant.def()
    }
}

impl Related<super::qr_codes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QrCodes.def()
    }
}

impl Related<super::pass_validations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PassValidations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
