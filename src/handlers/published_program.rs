use crate::models::*;
use crate::services::ProgramService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/published-programs",
    tag = "published_program",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)"),
        ("q" = Option<String>, Query, description = "按名称或场地搜索")
    ),
    responses(
        (status = 200, description = "获取公开活动成功", body = PublishedProgramPageResponse)
    )
)]
/// 公开活动列表（无需登录）
pub async fn list_published_programs(
    program_service: web::Data<ProgramService>,
    query: web::Query<PublishedProgramQuery>,
) -> Result<HttpResponse> {
    match program_service.list_published_programs(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/published-programs/{program_id}",
    tag = "published_program",
    params(
        ("program_id" = Uuid, Path, description = "活动ID")
    ),
    responses(
        (status = 200, description = "获取公开活动详情成功", body = PublishedProgramDetailResponse),
        (status = 400, description = "活动不存在或未发布")
    )
)]
pub async fn get_published_program(
    program_service: web::Data<ProgramService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    match program_service.get_published_program(path.into_inner()).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn published_program_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/published-programs")
            .route("", web::get().to(list_published_programs))
            .route("/{program_id}", web::get().to(get_published_program)),
    );
}
