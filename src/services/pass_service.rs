use crate::entities::{
    PassStatus, QrCodeStatus, pass_entity as passes, pass_type_entity as pass_types,
    program_entity as programs, user_entity as users,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    PageQuery, PaginatedResponse, PaginationParams, PassPageResponse, PassResponse,
    PurchasePassResponse, QrCodeResponse,
};
use crate::services::CodeIssuer;
use crate::store::inventory;
use crate::utils::InventoryLocks;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct PassService {
    pool: DatabaseConnection,
    code_issuer: CodeIssuer,
    locks: InventoryLocks,
}

impl PassService {
    pub fn new(pool: DatabaseConnection, code_issuer: CodeIssuer, locks: InventoryLocks) -> Self {
        Self {
            pool,
            code_issuer,
            locks,
        }
    }

    /// 购票
    ///
    /// 流程:
    /// 1. 按票种加进程内锁，开启事务并对票种行加排他锁
    /// 2. 票种不存在或不属于该活动 -> PassTypeNotFound
    /// 3. 事务内统计已售数量，超出总量 -> PassSoldOut
    /// 4. 写入票据，签发二维码与手动核验码并回写到票据
    /// 5. 提交事务；任一步失败事务在 drop 时回滚
    ///
    /// 不限量票种同样串行化。
    pub async fn purchase_pass(
        &self,
        user_id: Uuid,
        program_id: Uuid,
        pass_type_id: Uuid,
    ) -> AppResult<PurchasePassResponse> {
        let _guard = self.locks.pass_types.lock(pass_type_id).await;
        let txn = self.pool.begin().await?;

        let pass_type = inventory::find_pass_type_with_lock(&txn, pass_type_id)
            .await?
            .filter(|pt| pt.program_id == program_id)
            .ok_or(AppError::PassTypeNotFound(pass_type_id))?;

        if users::Entity::find_by_id(user_id).one(&txn).await?.is_none() {
            return Err(AppError::UserNotFound(user_id));
        }

        let sold = inventory::count_passes_for_type(&txn, pass_type_id).await?;
        if !pass_type.has_capacity_for_one_more(sold) {
            log::info!(
                "Pass type {pass_type_id} sold out ({sold} of {:?})",
                pass_type.total_available
            );
            return Err(AppError::PassSoldOut);
        }

        let now = Utc::now();
        let pass = inventory::insert_pass(
            &txn,
            passes::ActiveModel {
                id: Set(Uuid::new_v4()),
                pass_type_id: Set(pass_type_id),
                registrant_id: Set(user_id),
                status: Set(PassStatus::Active),
                manual_code: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            },
        )
        .await?;

        let issued = self.code_issuer.issue(&txn, &pass).await?;

        let mut am = pass.into_active_model();
        am.manual_code = Set(Some(issued.manual_code));
        am.updated_at = Set(Utc::now());
        let pass = inventory::update_pass(&txn, am)
            .await
            .map_err(manual_code_conflict)?;

        let program = inventory::find_program(&txn, program_id)
            .await?
            .ok_or(AppError::ProgramNotFound(program_id))?;

        txn.commit().await?;

        log::info!(
            "Pass {} purchased by {user_id} for pass type {pass_type_id} ({} sold)",
            pass.id,
            sold + 1
        );

        Ok(PurchasePassResponse {
            pass: PassResponse::new(pass, &pass_type, &program),
            qr_code_id: issued.qr_code.id,
        })
    }

    /// 分页获取用户的票据（倒序）
    pub async fn list_passes_for_user(
        &self,
        user_id: Uuid,
        query: &PageQuery,
    ) -> AppResult<PassPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let base_query = passes::Entity::find().filter(passes::Column::RegistrantId.eq(user_id));
        let total = base_query.clone().count(&self.pool).await?;

        let rows = base_query
            .find_also_related(pass_types::Entity)
            .order_by_desc(passes::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let program_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, pt)| pt.as_ref().map(|pt| pt.program_id))
            .collect();
        let program_map: HashMap<Uuid, programs::Model> = programs::Entity::find()
            .filter(programs::Column::Id.is_in(program_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut items = Vec::with_capacity(rows.len());
        for (pass, pass_type) in rows {
            let Some(pass_type) = pass_type else { continue };
            let Some(program) = program_map.get(&pass_type.program_id) else {
                continue;
            };
            items.push(PassResponse::new(pass, &pass_type, program));
        }

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn get_pass_for_user(&self, user_id: Uuid, pass_id: Uuid) -> AppResult<PassResponse> {
        let pass = self.owned_pass(user_id, pass_id).await?;
        let (pass_type, program) = inventory::pass_context(&self.pool, &pass)
            .await?
            .ok_or_else(|| AppError::NotFound("Pass not found".to_string()))?;
        Ok(PassResponse::new(pass, &pass_type, &program))
    }

    /// 获取票据当前有效的二维码
    pub async fn get_qr_code_for_user(
        &self,
        user_id: Uuid,
        pass_id: Uuid,
    ) -> AppResult<QrCodeResponse> {
        let pass = self.owned_pass(user_id, pass_id).await?;
        let qr_code = inventory::find_qr_code_for_pass(&self.pool, pass.id, QrCodeStatus::Active)
            .await?
            .ok_or_else(|| AppError::NotFound("No active QR code for pass".to_string()))?;
        Ok(qr_code.into())
    }

    /// 取消票据：状态置为 CANCELLED 并作废其全部二维码
    /// 已取消的票据仍占用库存名额
    pub async fn cancel_pass(&self, user_id: Uuid, pass_id: Uuid) -> AppResult<PassResponse> {
        let _guard = self.locks.passes.lock(pass_id).await;
        let txn = self.pool.begin().await?;

        let pass = inventory::find_pass_with_lock(&txn, pass_id)
            .await?
            .filter(|p| p.registrant_id == user_id)
            .ok_or_else(|| AppError::NotFound("Pass not found".to_string()))?;

        if pass.status == PassStatus::Cancelled {
            return Err(AppError::ValidationError(
                "Pass is already cancelled".to_string(),
            ));
        }

        let mut am = pass.into_active_model();
        am.status = Set(PassStatus::Cancelled);
        am.updated_at = Set(Utc::now());
        let pass = inventory::update_pass(&txn, am).await?;

        let revoked = self.code_issuer.revoke_for_pass(&txn, pass.id).await?;

        let (pass_type, program) = inventory::pass_context(&txn, &pass)
            .await?
            .ok_or_else(|| AppError::NotFound("Pass not found".to_string()))?;

        txn.commit().await?;

        log::info!("Pass {pass_id} cancelled by {user_id}, {revoked} QR code(s) revoked");
        Ok(PassResponse::new(pass, &pass_type, &program))
    }

    async fn owned_pass(&self, user_id: Uuid, pass_id: Uuid) -> AppResult<passes::Model> {
        inventory::find_pass(&self.pool, pass_id)
            .await?
            .filter(|p| p.registrant_id == user_id)
            .ok_or_else(|| AppError::NotFound("Pass not found".to_string()))
    }
}

/// 唯一索引兜底：核验码冲突视为签发失败
fn manual_code_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::CodeIssueError("manual code already assigned".to_string())
        }
        _ => AppError::DatabaseError(err),
    }
}
