use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 错误响应体 `{ "success": false, "error": { "code", "message" } }`
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// 通用分页查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PageQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20，最大 100)
    pub per_page: Option<u32>,
}
