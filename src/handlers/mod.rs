pub mod health;
pub mod pass;
pub mod pass_type;
pub mod pass_validation;
pub mod program;
pub mod published_program;
pub mod user;

pub use health::health_config;
pub use pass::pass_config;
pub use pass_validation::pass_validation_config;
pub use program::program_config;
pub use published_program::published_program_config;
pub use user::user_config;

use crate::error::{AppError, AppResult};
use crate::models::{CurrentUser, Role};
use actix_web::{HttpMessage, HttpRequest};

/// 从请求扩展中获取当前用户（中间件在鉴权后注入）
pub(crate) fn current_user(req: &HttpRequest) -> AppResult<CurrentUser> {
    req.extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}

/// 至少具备其中一个角色
pub(crate) fn require_any_role(user: &CurrentUser, roles: &[Role]) -> AppResult<()> {
    if roles.iter().any(|r| user.has_role(*r)) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
