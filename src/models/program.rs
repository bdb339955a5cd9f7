use crate::entities::{ProgramStatus, program_entity};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    CreatePassTypeRequest, PaginatedResponse, PassTypeResponse, PublishedPassTypeResponse,
    UpdatePassTypeRequest,
};

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateProgramRequest {
    pub name: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub status: ProgramStatus,
    pub pass_types: Vec<CreatePassTypeRequest>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdateProgramRequest {
    /// 必须与路径中的活动 id 一致
    pub id: Uuid,
    pub name: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub status: ProgramStatus,
    pub pass_types: Vec<UpdatePassTypeRequest>,
}

/// 活动公共字段校验
/// - 名称、场地非空
/// - 开始时间早于结束时间
/// - 报名时间要么都提供要么都不提供，且开始早于结束
fn validate_program_fields(
    name: &str,
    venue: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    registration_start: Option<DateTime<Utc>>,
    registration_end: Option<DateTime<Utc>>,
) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError("Program name is required".into()));
    }
    if venue.trim().is_empty() {
        return Err(AppError::ValidationError("Venue is required".into()));
    }
    if start_time >= end_time {
        return Err(AppError::ValidationError(
            "Start time must be before end time".into(),
        ));
    }
    match (registration_start, registration_end) {
        (None, None) => {}
        (Some(start), Some(end)) => {
            if start >= end {
                return Err(AppError::ValidationError(
                    "Registration start time must be before end time".into(),
                ));
            }
        }
        _ => {
            return Err(AppError::ValidationError(
                "Registration start and end must both be provided".into(),
            ));
        }
    }
    Ok(())
}

impl CreateProgramRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_program_fields(
            &self.name,
            &self.venue,
            self.start_time,
            self.end_time,
            self.registration_start,
            self.registration_end,
        )?;
        if self.pass_types.is_empty() {
            return Err(AppError::ValidationError(
                "At least one pass type required".into(),
            ));
        }
        self.pass_types.iter().try_for_each(|pt| pt.validate())
    }
}

impl UpdateProgramRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_program_fields(
            &self.name,
            &self.venue,
            self.start_time,
            self.end_time,
            self.registration_start,
            self.registration_end,
        )?;
        if self.pass_types.is_empty() {
            return Err(AppError::ValidationError(
                "At least one pass type required".into(),
            ));
        }
        self.pass_types.iter().try_for_each(|pt| pt.validate())
    }
}

/// 活动列表项
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgramResponse {
    pub id: Uuid,
    pub name: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub status: ProgramStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<program_entity::Model> for ProgramResponse {
    fn from(m: program_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            venue: m.venue,
            start_time: m.start_time,
            end_time: m.end_time,
            registration_start: m.registration_start,
            registration_end: m.registration_end,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// 主办方视角的活动详情
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgramDetailResponse {
    #[serde(flatten)]
    pub program: ProgramResponse,
    pub pass_types: Vec<PassTypeResponse>,
}

/// 公开活动列表项
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishedProgramResponse {
    pub id: Uuid,
    pub name: String,
    pub venue: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<program_entity::Model> for PublishedProgramResponse {
    fn from(m: program_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            venue: m.venue,
            start_time: m.start_time,
            end_time: m.end_time,
        }
    }
}

/// 公开活动详情（含票种剩余数量）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishedProgramDetailResponse {
    #[serde(flatten)]
    pub program: PublishedProgramResponse,
    pub registration_start: Option<DateTime<Utc>>,
    pub registration_end: Option<DateTime<Utc>>,
    pub pass_types: Vec<PublishedPassTypeResponse>,
}

/// 公开活动查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PublishedProgramQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// 按名称或场地模糊搜索（不区分大小写）
    pub q: Option<String>,
}

pub type ProgramPageResponse = PaginatedResponse<ProgramResponse>;
pub type PublishedProgramPageResponse = PaginatedResponse<PublishedProgramResponse>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn valid_request() -> CreateProgramRequest {
        let start = Utc::now() + Duration::days(7);
        CreateProgramRequest {
            name: "Spring Conference".to_string(),
            venue: "Main Hall".to_string(),
            start_time: start,
            end_time: start + Duration::hours(8),
            registration_start: None,
            registration_end: None,
            status: ProgramStatus::Published,
            pass_types: vec![CreatePassTypeRequest {
                name: "General".to_string(),
                price_cents: 2500,
                description: None,
                total_available: Some(100),
            }],
        }
    }

    #[test]
    fn test_valid_program_request() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_start_must_precede_end() {
        let mut req = valid_request();
        req.end_time = req.start_time;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_registration_window_both_or_none() {
        let mut req = valid_request();
        req.registration_start = Some(Utc::now());
        assert!(req.validate().is_err());

        req.registration_end = Some(Utc::now() + Duration::days(1));
        assert!(req.validate().is_ok());

        req.registration_end = req.registration_start;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_requires_pass_types() {
        let mut req = valid_request();
        req.pass_types.clear();
        assert!(matches!(req.validate(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_blank_venue_rejected() {
        let mut req = valid_request();
        req.venue = "   ".to_string();
        assert!(req.validate().is_err());
    }
}
