use crate::config::CodeConfig;
use crate::entities::{QrCodeStatus, pass_entity as passes, qr_code_entity as qr_codes};
use crate::error::{AppError, AppResult};
use crate::store::inventory;
use crate::utils::generate_manual_code;
use chrono::Utc;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use std::sync::Arc;
use uuid::Uuid;

type CodeGenerator = Arc<dyn Fn(usize) -> String + Send + Sync>;

/// 为票据签发的凭证
#[derive(Debug, Clone)]
pub struct IssuedCodes {
    pub qr_code: qr_codes::Model,
    pub manual_code: String,
}

/// 凭证签发：二维码 + 手动核验码
/// 必须在购票事务内调用，任何失败都会使整个购票回滚
#[derive(Clone)]
pub struct CodeIssuer {
    config: CodeConfig,
    generator: CodeGenerator,
}

impl CodeIssuer {
    pub fn new(config: CodeConfig) -> Self {
        Self::with_generator(config, Arc::new(generate_manual_code))
    }

    pub fn with_generator(config: CodeConfig, generator: CodeGenerator) -> Self {
        Self { config, generator }
    }

    pub async fn issue<C: ConnectionTrait>(
        &self,
        conn: &C,
        pass: &passes::Model,
    ) -> AppResult<IssuedCodes> {
        let manual_code = self.unique_manual_code(conn).await?;

        let now = Utc::now();
        let qr_id = Uuid::new_v4();
        let qr_code = inventory::insert_qr_code(
            conn,
            qr_codes::ActiveModel {
                id: Set(qr_id),
                pass_id: Set(pass.id),
                status: Set(QrCodeStatus::Active),
                // 扫码得到的即二维码 id
                value: Set(qr_id.to_string()),
                created_at: Set(now),
                updated_at: Set(now),
            },
        )
        .await?;

        Ok(IssuedCodes {
            qr_code,
            manual_code,
        })
    }

    /// 作废票据下所有有效二维码，返回作废数量
    pub async fn revoke_for_pass<C: ConnectionTrait>(
        &self,
        conn: &C,
        pass_id: Uuid,
    ) -> AppResult<u64> {
        let result = qr_codes::Entity::update_many()
            .set(qr_codes::ActiveModel {
                status: Set(QrCodeStatus::Revoked),
                updated_at: Set(Utc::now()),
                ..Default::default()
            })
            .filter(qr_codes::Column::PassId.eq(pass_id))
            .filter(qr_codes::Column::Status.eq(QrCodeStatus::Active))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    async fn unique_manual_code<C: ConnectionTrait>(&self, conn: &C) -> AppResult<String> {
        for attempt in 1..=self.config.max_issue_attempts {
            let code = (self.generator)(self.config.manual_code_length);
            if !inventory::manual_code_exists(conn, &code).await? {
                return Ok(code);
            }
            log::warn!("Manual code collision on attempt {attempt}, regenerating");
        }
        Err(AppError::CodeIssueError(format!(
            "no unique manual code after {} attempts",
            self.config.max_issue_attempts
        )))
    }
}
