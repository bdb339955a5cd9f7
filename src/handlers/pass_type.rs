use super::current_user;
use crate::models::*;
use crate::services::{PassService, UserService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use uuid::Uuid;

#[utoipa::path(
    post,
    path = "/programs/{program_id}/pass-types/{pass_type_id}/passes",
    tag = "pass",
    params(
        ("program_id" = Uuid, Path, description = "活动ID"),
        ("pass_type_id" = Uuid, Path, description = "票种ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "购票成功", body = PurchasePassResponse),
        (status = 400, description = "票种不存在 / 已售罄"),
        (status = 401, description = "未授权")
    )
)]
/// 购买一张票
pub async fn purchase_pass(
    pass_service: web::Data<PassService>,
    user_service: web::Data<UserService>,
    req: HttpRequest,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (program_id, pass_type_id) = path.into_inner();
    let result = async {
        let user = current_user(&req)?;
        user_service.ensure_user(&user).await?;
        pass_service
            .purchase_pass(user.id, program_id, pass_type_id)
            .await
    }
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Created().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 挂在 /programs 作用域下
pub fn pass_type_config(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/{program_id}/pass-types/{pass_type_id}/passes",
        web::post().to(purchase_pass),
    );
}
