use crate::entities::pass_type_entity;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// 创建票种请求（随活动一起提交）
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreatePassTypeRequest {
    pub name: String,
    /// 价格（分），不可为负
    pub price_cents: i64,
    pub description: Option<String>,
    /// 总库存，缺省表示不限量
    pub total_available: Option<i32>,
}

/// 更新活动时的票种条目：带 id 为修改，不带 id 为新增
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UpdatePassTypeRequest {
    pub id: Option<Uuid>,
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
    pub total_available: Option<i32>,
}

fn validate_pass_type_fields(
    name: &str,
    price_cents: i64,
    total_available: Option<i32>,
) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Pass type name is required".to_string(),
        ));
    }
    if price_cents < 0 {
        return Err(AppError::ValidationError(
            "Price must be 0 or greater".to_string(),
        ));
    }
    if total_available.is_some_and(|n| n < 0) {
        return Err(AppError::ValidationError(
            "Total available must be 0 or greater".to_string(),
        ));
    }
    Ok(())
}

impl CreatePassTypeRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_pass_type_fields(&self.name, self.price_cents, self.total_available)
    }
}

impl UpdatePassTypeRequest {
    pub fn validate(&self) -> AppResult<()> {
        validate_pass_type_fields(&self.name, self.price_cents, self.total_available)
    }
}

/// 票种信息（含已售数量与剩余数量）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PassTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
    pub total_available: Option<i32>,
    pub sold: u64,
    /// 不限量时为 null
    pub remaining: Option<i64>,
}

impl PassTypeResponse {
    pub fn from_model(m: pass_type_entity::Model, sold: u64) -> Self {
        let remaining = m.remaining(sold);
        Self {
            id: m.id,
            name: m.name,
            price_cents: m.price_cents,
            description: m.description,
            total_available: m.total_available,
            sold,
            remaining,
        }
    }
}

/// 公开展示的票种（不暴露已售数量）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishedPassTypeResponse {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub description: Option<String>,
    pub remaining: Option<i64>,
    pub sold_out: bool,
}

impl PublishedPassTypeResponse {
    pub fn from_model(m: pass_type_entity::Model, sold: u64) -> Self {
        let remaining = m.remaining(sold);
        let sold_out = !m.has_capacity_for_one_more(sold);
        Self {
            id: m.id,
            name: m.name,
            price_cents: m.price_cents,
            description: m.description,
            remaining,
            sold_out,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, price_cents: i64, total_available: Option<i32>) -> CreatePassTypeRequest {
        CreatePassTypeRequest {
            name: name.to_string(),
            price_cents,
            description: None,
            total_available,
        }
    }

    #[test]
    fn test_pass_type_validation() {
        assert!(request("VIP", 0, None).validate().is_ok());
        assert!(request("VIP", 5000, Some(0)).validate().is_ok());
        assert!(request("  ", 5000, Some(10)).validate().is_err());
        assert!(request("VIP", -1, Some(10)).validate().is_err());
        assert!(request("VIP", 100, Some(-5)).validate().is_err());
    }
}
