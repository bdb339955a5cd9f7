use super::{current_user, require_any_role};
use crate::models::*;
use crate::services::PassValidationService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/pass-validations",
    tag = "pass_validation",
    request_body = ValidatePassRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "核验完成（重复核验返回 INVALID）", body = PassValidationResponse),
        (status = 400, description = "请求参数错误 / 活动不存在 / 票据不属于该活动"),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要 STAFF 角色"),
        (status = 404, description = "二维码或核验码不存在")
    )
)]
/// 现场核验票据（扫码或手动输入核验码）
pub async fn validate_pass(
    validation_service: web::Data<PassValidationService>,
    req: HttpRequest,
    request: web::Json<ValidatePassRequest>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        require_any_role(&user, &[Role::Staff])?;
        validation_service.validate(user.id, &request).await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/passes/{pass_id}/validations",
    tag = "pass_validation",
    params(
        ("pass_id" = Uuid, Path, description = "票据ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取核验历史成功", body = [PassValidationResponse]),
        (status = 401, description = "未授权"),
        (status = 403, description = "需要 STAFF 角色或为该活动主办方"),
        (status = 404, description = "票据不存在")
    )
)]
/// 按时间顺序返回票据的核验历史
pub async fn list_validations(
    validation_service: web::Data<PassValidationService>,
    req: HttpRequest,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let result = async {
        let user = current_user(&req)?;
        require_any_role(&user, &[Role::Staff, Role::Organizer])?;
        validation_service
            .list_validations(&user, path.into_inner())
            .await
    }
    .await;

    match result {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn pass_validation_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/pass-validations", web::post().to(validate_pass));
}

/// 挂在 /passes 作用域下
pub fn pass_history_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/{pass_id}/validations", web::get().to(list_validations));
}
