use crate::entities::{
    PassStatus, QrCodeStatus, pass_entity, pass_type_entity, program_entity, qr_code_entity,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::PaginatedResponse;

/// 票据信息（含票种与活动快照）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PassResponse {
    pub id: Uuid,
    pub status: PassStatus,
    pub manual_code: Option<String>,
    pub pass_type_id: Uuid,
    pub pass_type_name: String,
    pub pass_type_price_cents: i64,
    pub program_id: Uuid,
    pub program_name: String,
    pub program_venue: String,
    pub program_start_time: DateTime<Utc>,
    pub program_end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PassResponse {
    pub fn new(
        pass: pass_entity::Model,
        pass_type: &pass_type_entity::Model,
        program: &program_entity::Model,
    ) -> Self {
        Self {
            id: pass.id,
            status: pass.status,
            manual_code: pass.manual_code,
            pass_type_id: pass_type.id,
            pass_type_name: pass_type.name.clone(),
            pass_type_price_cents: pass_type.price_cents,
            program_id: program.id,
            program_name: program.name.clone(),
            program_venue: program.venue.clone(),
            program_start_time: program.start_time,
            program_end_time: program.end_time,
            created_at: pass.created_at,
        }
    }
}

/// 购票结果：票据 + 新签发的二维码 id
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PurchasePassResponse {
    #[serde(flatten)]
    pub pass: PassResponse,
    pub qr_code_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QrCodeResponse {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub status: QrCodeStatus,
    /// 可扫描的载荷文本（前端自行渲染成图片）
    pub value: String,
    pub created_at: DateTime<Utc>,
}

impl From<qr_code_entity::Model> for QrCodeResponse {
    fn from(m: qr_code_entity::Model) -> Self {
        Self {
            id: m.id,
            pass_id: m.pass_id,
            status: m.status,
            value: m.value,
            created_at: m.created_at,
        }
    }
}

pub type PassPageResponse = PaginatedResponse<PassResponse>;
