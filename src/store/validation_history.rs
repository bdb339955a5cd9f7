use crate::entities::{PassValidationStatus, pass_validation_entity as validations};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// 追加一条核验记录（只插入，从不更新或删除）
pub async fn save_pass_validation<C: ConnectionTrait>(
    conn: &C,
    record: validations::ActiveModel,
) -> Result<validations::Model, DbErr> {
    record.insert(conn).await
}

/// 按时间顺序返回票据的核验历史
pub async fn history_for_pass<C: ConnectionTrait>(
    conn: &C,
    pass_id: Uuid,
) -> Result<Vec<validations::Model>, DbErr> {
    validations::Entity::find()
        .filter(validations::Column::PassId.eq(pass_id))
        .order_by_asc(validations::Column::CreatedAt)
        .all(conn)
        .await
}

/// 首次核验生效：历史中没有 VALID 记录则本次为 VALID，否则为 INVALID
pub fn outcome_for_next_attempt(history: &[validations::Model]) -> PassValidationStatus {
    if history
        .iter()
        .any(|v| v.status == PassValidationStatus::Valid)
    {
        PassValidationStatus::Invalid
    } else {
        PassValidationStatus::Valid
    }
}
