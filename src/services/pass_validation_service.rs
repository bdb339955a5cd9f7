use crate::entities::{
    PassStatus, QrCodeStatus, ValidationMethod, pass_entity as passes,
    pass_validation_entity as validations, program_entity as programs,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CurrentUser, PassValidationResponse, Role, ValidatePassRequest, ValidationTarget,
};
use crate::store::{inventory, validation_history};
use crate::utils::InventoryLocks;
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use uuid::Uuid;

#[derive(Clone)]
pub struct PassValidationService {
    pool: DatabaseConnection,
    locks: InventoryLocks,
}

impl PassValidationService {
    pub fn new(pool: DatabaseConnection, locks: InventoryLocks) -> Self {
        Self { pool, locks }
    }

    /// 按请求中的方式核验
    pub async fn validate(
        &self,
        staff_id: Uuid,
        request: &ValidatePassRequest,
    ) -> AppResult<PassValidationResponse> {
        match request.target()? {
            ValidationTarget::QrCode(qr_code_id) => {
                self.validate_by_qr(staff_id, request.program_id, qr_code_id)
                    .await
            }
            ValidationTarget::ManualCode(code) => {
                self.validate_by_manual_code(staff_id, request.program_id, &code)
                    .await
            }
        }
    }

    /// 扫码核验：二维码必须存在且有效
    pub async fn validate_by_qr(
        &self,
        staff_id: Uuid,
        program_id: Uuid,
        qr_code_id: Uuid,
    ) -> AppResult<PassValidationResponse> {
        let program = self.require_program(program_id).await?;

        let qr_code =
            inventory::find_qr_code_by_id_and_status(&self.pool, qr_code_id, QrCodeStatus::Active)
                .await?
                .ok_or(AppError::QrCodeNotFound(qr_code_id))?;
        let pass = inventory::find_pass(&self.pool, qr_code.pass_id)
            .await?
            .filter(|p| p.status == PassStatus::Active)
            .ok_or(AppError::QrCodeNotFound(qr_code_id))?;

        self.record_attempt(staff_id, &program, pass, ValidationMethod::QrScan, || {
            AppError::QrCodeNotFound(qr_code_id)
        })
        .await
    }

    /// 手动核验：核验码必须对应一张有效票据
    pub async fn validate_by_manual_code(
        &self,
        staff_id: Uuid,
        program_id: Uuid,
        manual_code: &str,
    ) -> AppResult<PassValidationResponse> {
        let program = self.require_program(program_id).await?;

        let pass = inventory::find_pass_by_manual_code(&self.pool, manual_code)
            .await?
            .ok_or(AppError::CodeNotFound)?;

        self.record_attempt(staff_id, &program, pass, ValidationMethod::Manual, || {
            AppError::CodeNotFound
        })
        .await
    }

    /// 票据的核验历史（工作人员或该活动的主办方可查看）
    pub async fn list_validations(
        &self,
        user: &CurrentUser,
        pass_id: Uuid,
    ) -> AppResult<Vec<PassValidationResponse>> {
        let pass = inventory::find_pass(&self.pool, pass_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Pass not found".to_string()))?;

        if !user.has_role(Role::Staff) {
            let (_, program) = inventory::pass_context(&self.pool, &pass)
                .await?
                .ok_or_else(|| AppError::NotFound("Pass not found".to_string()))?;
            if program.organizer_id != user.id {
                return Err(AppError::Forbidden);
            }
        }

        let history = validation_history::history_for_pass(&self.pool, pass.id).await?;
        Ok(history.into_iter().map(Into::into).collect())
    }

    async fn require_program(&self, program_id: Uuid) -> AppResult<programs::Model> {
        inventory::find_program(&self.pool, program_id)
            .await?
            .ok_or(AppError::ProgramNotFound(program_id))
    }

    /// 校验票据归属后，在票据锁内根据历史推导结果并追加记录
    async fn record_attempt(
        &self,
        staff_id: Uuid,
        program: &programs::Model,
        pass: passes::Model,
        method: ValidationMethod,
        not_found: impl Fn() -> AppError,
    ) -> AppResult<PassValidationResponse> {
        let (pass_type, _) = inventory::pass_context(&self.pool, &pass)
            .await?
            .ok_or_else(&not_found)?;
        if pass_type.program_id != program.id {
            log::warn!(
                "Pass {} belongs to program {}, rejected at program {}",
                pass.id,
                pass_type.program_id,
                program.id
            );
            return Err(AppError::ProgramPassMismatch(program.id));
        }

        let _guard = self.locks.passes.lock(pass.id).await;
        let txn = self.pool.begin().await?;

        // 加锁后重新读取，与并发的取消操作保持一致
        let pass = inventory::find_pass_with_lock(&txn, pass.id)
            .await?
            .filter(|p| p.status == PassStatus::Active)
            .ok_or_else(not_found)?;

        let history = validation_history::history_for_pass(&txn, pass.id).await?;
        let status = validation_history::outcome_for_next_attempt(&history);

        let record = validation_history::save_pass_validation(
            &txn,
            validations::ActiveModel {
                id: Set(Uuid::new_v4()),
                pass_id: Set(pass.id),
                program_id: Set(program.id),
                status: Set(status),
                validation_method: Set(method),
                validated_by: Set(Some(staff_id)),
                created_at: Set(Utc::now()),
            },
        )
        .await?;

        txn.commit().await?;

        log::info!(
            "Pass {} validated via {method} at program {} by {staff_id}: {status}",
            pass.id,
            program.id
        );
        Ok(record.into())
    }
}
