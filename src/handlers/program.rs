use super::{current_user, pass_type, require_any_role};
use crate::models::*;
use crate::services::{ProgramService, UserService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/programs",
    tag = "program",
    request_body = CreateProgramRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "创建活动成功", body = ProgramDetailResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要 ORGANIZER 角色")
    )
)]
/// 创建活动（含票种）
pub async fn create_program(
    program_service: web::Data<ProgramService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<CreateProgramRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        require_any_role(&user, &[Role::Organizer])?;
        user_service.ensure_user(&user).await?;
        program_service
            .create_program(user.id, request.into_inner())
            .await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/programs",
    tag = "program",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动列表成功", body = ProgramPageResponse),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要 ORGANIZER 角色")
    )
)]
/// 分页获取当前主办方的活动
pub async fn list_programs(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        require_any_role(&user, &[Role::Organizer])?;
        program_service
            .list_programs_for_organizer(user.id, &query)
            .await
    }
    .await;

    match result {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/programs/{program_id}",
    tag = "program",
    params(
        ("program_id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取活动详情成功", body = ProgramDetailResponse),
        (status = 400, description = "活动不存在"),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要 ORGANIZER 角色")
    )
)]
pub async fn get_program(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        require_any_role(&user, &[Role::Organizer])?;
        program_service
            .get_program_for_organizer(user.id, path.into_inner())
            .await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/programs/{program_id}",
    tag = "program",
    params(
        ("program_id" = Uuid, Path, description = "活动ID")
    ),
    request_body = UpdateProgramRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新活动成功", body = ProgramDetailResponse),
        (status = 400, description = "请求参数错误 / 活动或票种不存在"),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要 ORGANIZER 角色")
    )
)]
/// 更新活动并同步票种
pub async fn update_program(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
    request: web::Json<UpdateProgramRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        require_any_role(&user, &[Role::Organizer])?;
        program_service
            .update_program_for_organizer(user.id, path.into_inner(), request.into_inner())
            .await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/programs/{program_id}",
    tag = "program",
    params(
        ("program_id" = Uuid, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "删除成功"),
        (status = 400, description = "活动不存在"),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要 ORGANIZER 角色")
    )
)]
pub async fn delete_program(
    program_service: web::Data<ProgramService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        require_any_role(&user, &[Role::Organizer])?;
        program_service
            .delete_program_for_organizer(user.id, path.into_inner())
            .await
    }
    .await;

    match result {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(e) => Ok(e.error_response()),
    }
}

/// 路由配置
pub fn program_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/programs")
            .route("", web::post().to(create_program))
            .route("", web::get().to(list_programs))
            .route("/{program_id}", web::get().to(get_program))
            .route("/{program_id}", web::put().to(update_program))
            .route("/{program_id}", web::delete().to(delete_program))
            .configure(pass_type::pass_type_config),
    );
}
