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
pub enum PassValidationStatus {
    #[sea_orm(string_value = "VALID")]
    Valid,
    #[sea_orm(string_value = "INVALID")]
    Invalid,
}

impl std::fmt::Display for PassValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PassValidationStatus::Valid => write!(f, "VALID"),
            PassValidationStatus::Invalid => write!(f, "INVALID"),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationMethod {
    #[sea_orm(string_value = "QR_SCAN")]
    QrScan,
    #[sea_orm(string_value = "MANUAL")]
    Manual,
}

impl std::fmt::Display for ValidationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationMethod::QrScan => write!(f, "QR_SCAN"),
            ValidationMethod::Manual => write!(f, "MANUAL"),
        }
    }
}

/// 核验记录实体
/// 只追加不修改；票据是否已使用由历史记录推导
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pass_validations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub pass_id: Uuid,
    pub program_id: Uuid,
    pub status: PassValidationStatus,
    pub validation_method: ValidationMethod,
    /// 执行核验的工作人员
    pub validated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::passes::Entity",
        from = "Column::PassId",
        to = "super::passes::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Pass,
    #[sea_orm(
        belongs_to = "super::programs::Entity",
        from = "Column::ProgramId",
        to = "super::programs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Program,
}

impl Related<super::passes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pass.def()
    }
}

impl Related<super::programs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
