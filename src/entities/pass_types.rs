use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 票种实体
/// - price_cents 以分存储，非负
/// - total_available 为 None 表示不限量
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "pass_types")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub program_id: Uuid,
    pub name: String,
    pub price_cents: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub total_available: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// 已售 `sold` 张时能否再售出一张
    pub fn has_capacity_for_one_more(&self, sold: u64) -> bool {
        match self.total_available {
            None => true,
            Some(total) => sold < u64::try_from(total).unwrap_or(0),
        }
    }

    /// 剩余可售数量，不限量时为 None
    pub fn remaining(&self, sold: u64) -> Option<i64> {
        self.total_available
            .map(|total| (i64::from(total) - sold as i64).max(0))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::programs::Entity",
        from = "Column::ProgramId",
        to = "super::programs::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Program,
    #[sea_orm(has_many = "super::passes::Entity")]
    Passes,
}

impl Related<super::programs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Program.def()
    }
}

impl Related<super::passes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
