use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Pass type with ID '{0}' not found")]
    PassTypeNotFound(Uuid),

    #[error("Program with ID '{0}' not found")]
    ProgramNotFound(Uuid),

    #[error("QR code with ID '{0}' not found")]
    QrCodeNotFound(Uuid),

    #[error("No pass matches the supplied manual code")]
    CodeNotFound,

    #[error("Pass type is sold out")]
    PassSoldOut,

    #[error("Pass does not belong to program with ID '{0}'")]
    ProgramPassMismatch(Uuid),

    #[error("User with ID '{0}' not found")]
    UserNotFound(Uuid),

    #[error("Code issuance failed: {0}")]
    CodeIssueError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// HTTP status and stable machine-readable error code.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::AuthError(_) | AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR")
            }
            AppError::UserNotFound(_) => (StatusCode::UNAUTHORIZED, "USER_NOT_FOUND"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::PassSoldOut => (StatusCode::BAD_REQUEST, "PASS_SOLD_OUT"),
            AppError::PassTypeNotFound(_) => (StatusCode::BAD_REQUEST, "PASS_TYPE_NOT_FOUND"),
            AppError::ProgramNotFound(_) => (StatusCode::BAD_REQUEST, "PROGRAM_NOT_FOUND"),
            AppError::ProgramPassMismatch(_) => {
                (StatusCode::BAD_REQUEST, "PROGRAM_PASS_MISMATCH")
            }
            AppError::QrCodeNotFound(_) => (StatusCode::NOT_FOUND, "QR_CODE_NOT_FOUND"),
            AppError::CodeNotFound => (StatusCode::NOT_FOUND, "CODE_NOT_FOUND"),
            AppError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::CodeIssueError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CODE_ISSUE_ERROR")
            }
            AppError::ConfigError(_) | AppError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code) = self.status_and_code();

        // 仅对客户端暴露业务层信息，内部错误只写日志
        let message = if status_code.is_server_error() {
            log::error!("{error_code}: {self}");
            match self {
                AppError::DatabaseError(_) => "Database error".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            log::warn!("{error_code}: {self}");
            match self {
                AppError::JwtError(_) => "Invalid access token".to_string(),
                _ => self.to_string(),
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_are_client_errors() {
        assert_eq!(
            AppError::PassSoldOut.status_and_code(),
            (StatusCode::BAD_REQUEST, "PASS_SOLD_OUT")
        );
        assert_eq!(
            AppError::ProgramPassMismatch(Uuid::new_v4()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::PassTypeNotFound(Uuid::new_v4()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UserNotFound(Uuid::new_v4()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_lookup_errors_map_to_not_found() {
        assert_eq!(
            AppError::QrCodeNotFound(Uuid::new_v4()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::CodeNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::DatabaseError(sea_orm::DbErr::Custom("secret table".into()));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
