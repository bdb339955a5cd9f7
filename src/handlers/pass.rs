use super::{current_user, pass_validation};
use crate::models::*;
use crate::services::PassService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/passes",
    tag = "pass",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("per_page" = Option<u32>, Query, description = "每页数量 (默认20)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取我的票据成功", body = PassPageResponse),
        (status = 401, description = "未授权")
    )
)]
/// 分页获取当前用户的票据（倒序）
pub async fn list_passes(
    pass_service: web::Data<PassService>,
    req: HttpRequest,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        pass_service.list_passes_for_user(user.id, &query).await
    }
    .await;

    match result {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/passes/{pass_id}",
    tag = "pass",
    params(
        ("pass_id" = Uuid, Path, description = "票据ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取票据成功", body = PassResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "票据不存在")
    )
)]
pub async fn get_pass(
    pass_service: web::Data<PassService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        pass_service
            .get_pass_for_user(user.id, path.into_inner())
            .await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/passes/{pass_id}/qr-codes",
    tag = "pass",
    params(
        ("pass_id" = Uuid, Path, description = "票据ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取二维码成功", body = QrCodeResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "票据不存在或没有有效二维码")
    )
)]
/// 获取票据当前有效的二维码载荷
pub async fn get_qr_code(
    pass_service: web::Data<PassService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        pass_service
            .get_qr_code_for_user(user.id, path.into_inner())
            .await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/passes/{pass_id}/cancel",
    tag = "pass",
    params(
        ("pass_id" = Uuid, Path, description = "票据ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "取消成功", body = PassResponse),
        (status = 400, description = "票据已取消"),
        (status = 401, description = "未授权"),
        (status = 404, description = "票据不存在")
    )
)]
/// 取消票据并作废二维码
pub async fn cancel_pass(
    pass_service: web::Data<PassService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        pass_service.cancel_pass(user.id, path.into_inner()).await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn pass_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/passes")
            .route("", web::get().to(list_passes))
            .route("/{pass_id}", web::get().to(get_pass))
            .route("/{pass_id}/qr-codes", web::get().to(get_qr_code))
            .route("/{pass_id}/cancel", web::post().to(cancel_pass))
            .configure(pass_validation::pass_history_config),
    );
}
