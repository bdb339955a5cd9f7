use crate::entities::{PassValidationStatus, ValidationMethod, pass_validation_entity};
use crate::error::{AppError, AppResult};
use crate::utils::normalize_manual_code;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// 核验请求
/// - QR_SCAN: 必须提供 qr_code_id，且不能提供 manual_code
/// - MANUAL: 必须提供 manual_code，且不能提供 qr_code_id
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ValidatePassRequest {
    pub program_id: Uuid,
    pub method: ValidationMethod,
    pub qr_code_id: Option<Uuid>,
    pub manual_code: Option<String>,
}

/// 已校验的核验目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationTarget {
    QrCode(Uuid),
    ManualCode(String),
}

impl ValidatePassRequest {
    pub fn target(&self) -> AppResult<ValidationTarget> {
        let manual_code = self
            .manual_code
            .as_deref()
            .map(normalize_manual_code)
            .filter(|c| !c.is_empty());

        match (self.method, self.qr_code_id, manual_code) {
            (ValidationMethod::QrScan, Some(qr_code_id), None) => {
                Ok(ValidationTarget::QrCode(qr_code_id))
            }
            (ValidationMethod::QrScan, None, _) => Err(AppError::ValidationError(
                "qr_code_id is required for QR_SCAN".into(),
            )),
            (ValidationMethod::QrScan, Some(_), Some(_)) => Err(AppError::ValidationError(
                "manual_code must not be provided for QR_SCAN".into(),
            )),
            (ValidationMethod::Manual, None, Some(code)) => Ok(ValidationTarget::ManualCode(code)),
            (ValidationMethod::Manual, _, None) => Err(AppError::ValidationError(
                "manual_code is required for MANUAL".into(),
            )),
            (ValidationMethod::Manual, Some(_), Some(_)) => Err(AppError::ValidationError(
                "qr_code_id must not be provided for MANUAL".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PassValidationResponse {
    pub id: Uuid,
    pub pass_id: Uuid,
    pub program_id: Uuid,
    pub status: PassValidationStatus,
    pub validation_method: ValidationMethod,
    pub validated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<pass_validation_entity::Model> for PassValidationResponse {
    fn from(m: pass_validation_entity::Model) -> Self {
        Self {
            id: m.id,
            pass_id: m.pass_id,
            program_id: m.program_id,
            status: m.status,
            validation_method: m.validation_method,
            validated_by: m.validated_by,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(
        method: ValidationMethod,
        qr_code_id: Option<Uuid>,
        manual_code: Option<&str>,
    ) -> ValidatePassRequest {
        ValidatePassRequest {
            program_id: Uuid::new_v4(),
            method,
            qr_code_id,
            manual_code: manual_code.map(str::to_string),
        }
    }

    #[test]
    fn test_qr_scan_target() {
        let qr = Uuid::new_v4();
        assert_eq!(
            request(ValidationMethod::QrScan, Some(qr), None).target().unwrap(),
            ValidationTarget::QrCode(qr)
        );
        assert!(request(ValidationMethod::QrScan, None, None).target().is_err());
        assert!(
            request(ValidationMethod::QrScan, Some(qr), Some("ABCD2345"))
                .target()
                .is_err()
        );
    }

    #[test]
    fn test_manual_target_is_normalised() {
        assert_eq!(
            request(ValidationMethod::Manual, None, Some(" abcd2345 "))
                .target()
                .unwrap(),
            ValidationTarget::ManualCode("ABCD2345".to_string())
        );
        assert!(request(ValidationMethod::Manual, None, Some("   ")).target().is_err());
        assert!(
            request(ValidationMethod::Manual, Some(Uuid::new_v4()), Some("ABCD2345"))
                .target()
                .is_err()
        );
    }

    #[test]
    fn test_method_deserialises_from_wire_names() {
        let req: ValidatePassRequest = serde_json::from_str(&format!(
            r#"{{"program_id":"{}","method":"QR_SCAN","qr_code_id":"{}"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        ))
        .unwrap();
        assert_eq!(req.method, ValidationMethod::QrScan);
        assert!(req.manual_code.is_none());
    }
}
