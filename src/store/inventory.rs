use crate::entities::{
    PassStatus, QrCodeStatus, pass_entity as passes, pass_type_entity as pass_types,
    program_entity as programs, qr_code_entity as qr_codes,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use std::collections::HashMap;
use uuid::Uuid;

/// 读取票种并加行级排他锁（SELECT ... FOR UPDATE）
/// 必须在事务内调用；SQLite 不支持行锁，此时仅依赖进程内锁与单写者语义
pub async fn find_pass_type_with_lock<C: ConnectionTrait>(
    conn: &C,
    pass_type_id: Uuid,
) -> Result<Option<pass_types::Model>, DbErr> {
    pass_types::Entity::find_by_id(pass_type_id)
        .lock_exclusive()
        .one(conn)
        .await
}

pub async fn find_pass_type<C: ConnectionTrait>(
    conn: &C,
    pass_type_id: Uuid,
) -> Result<Option<pass_types::Model>, DbErr> {
    pass_types::Entity::find_by_id(pass_type_id).one(conn).await
}

pub async fn pass_types_for_program<C: ConnectionTrait>(
    conn: &C,
    program_id: Uuid,
) -> Result<Vec<pass_types::Model>, DbErr> {
    pass_types::Entity::find()
        .filter(pass_types::Column::ProgramId.eq(program_id))
        .order_by_asc(pass_types::Column::CreatedAt)
        .all(conn)
        .await
}

pub async fn pass_types_for_program_with_lock<C: ConnectionTrait>(
    conn: &C,
    program_id: Uuid,
) -> Result<Vec<pass_types::Model>, DbErr> {
    pass_types::Entity::find()
        .filter(pass_types::Column::ProgramId.eq(program_id))
        .order_by_asc(pass_types::Column::CreatedAt)
        .lock_exclusive()
        .all(conn)
        .await
}

/// 统计票种已售数量（含已取消票据）
pub async fn count_passes_for_type<C: ConnectionTrait>(
    conn: &C,
    pass_type_id: Uuid,
) -> Result<u64, DbErr> {
    passes::Entity::find()
        .filter(passes::Column::PassTypeId.eq(pass_type_id))
        .count(conn)
        .await
}

/// 批量统计多个票种的已售数量，未售出的票种不在结果中
pub async fn count_passes_by_type<C: ConnectionTrait>(
    conn: &C,
    pass_type_ids: &[Uuid],
) -> Result<HashMap<Uuid, u64>, DbErr> {
    if pass_type_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, i64)> = passes::Entity::find()
        .select_only()
        .column(passes::Column::PassTypeId)
        .column_as(passes::Column::Id.count(), "sold")
        .filter(passes::Column::PassTypeId.is_in(pass_type_ids.iter().copied()))
        .group_by(passes::Column::PassTypeId)
        .into_tuple()
        .all(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, sold)| (id, sold.max(0) as u64))
        .collect())
}

/// 新建票据；主键由调用方生成
pub async fn insert_pass<C: ConnectionTrait>(
    conn: &C,
    pass: passes::ActiveModel,
) -> Result<passes::Model, DbErr> {
    pass.insert(conn).await
}

pub async fn update_pass<C: ConnectionTrait>(
    conn: &C,
    pass: passes::ActiveModel,
) -> Result<passes::Model, DbErr> {
    pass.update(conn).await
}

pub async fn find_pass<C: ConnectionTrait>(
    conn: &C,
    pass_id: Uuid,
) -> Result<Option<passes::Model>, DbErr> {
    passes::Entity::find_by_id(pass_id).one(conn).await
}

pub async fn find_pass_with_lock<C: ConnectionTrait>(
    conn: &C,
    pass_id: Uuid,
) -> Result<Option<passes::Model>, DbErr> {
    passes::Entity::find_by_id(pass_id)
        .lock_exclusive()
        .one(conn)
        .await
}

/// 按手动核验码查找有效票据
pub async fn find_pass_by_manual_code<C: ConnectionTrait>(
    conn: &C,
    manual_code: &str,
) -> Result<Option<passes::Model>, DbErr> {
    passes::Entity::find()
        .filter(passes::Column::ManualCode.eq(manual_code))
        .filter(passes::Column::Status.eq(PassStatus::Active))
        .one(conn)
        .await
}

pub async fn manual_code_exists<C: ConnectionTrait>(
    conn: &C,
    manual_code: &str,
) -> Result<bool, DbErr> {
    let count = passes::Entity::find()
        .filter(passes::Column::ManualCode.eq(manual_code))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub async fn insert_qr_code<C: ConnectionTrait>(
    conn: &C,
    qr_code: qr_codes::ActiveModel,
) -> Result<qr_codes::Model, DbErr> {
    qr_code.insert(conn).await
}

pub async fn find_qr_code_by_id_and_status<C: ConnectionTrait>(
    conn: &C,
    qr_code_id: Uuid,
    status: QrCodeStatus,
) -> Result<Option<qr_codes::Model>, DbErr> {
    qr_codes::Entity::find_by_id(qr_code_id)
        .filter(qr_codes::Column::Status.eq(status))
        .one(conn)
        .await
}

pub async fn find_qr_code_for_pass<C: ConnectionTrait>(
    conn: &C,
    pass_id: Uuid,
    status: QrCodeStatus,
) -> Result<Option<qr_codes::Model>, DbErr> {
    qr_codes::Entity::find()
        .filter(qr_codes::Column::PassId.eq(pass_id))
        .filter(qr_codes::Column::Status.eq(status))
        .order_by_desc(qr_codes::Column::CreatedAt)
        .one(conn)
        .await
}

pub async fn find_program<C: ConnectionTrait>(
    conn: &C,
    program_id: Uuid,
) -> Result<Option<programs::Model>, DbErr> {
    programs::Entity::find_by_id(program_id).one(conn).await
}

/// 加载票据所属的票种与活动
pub async fn pass_context<C: ConnectionTrait>(
    conn: &C,
    pass: &passes::Model,
) -> Result<Option<(pass_types::Model, programs::Model)>, DbErr> {
    let Some(pass_type) = find_pass_type(conn, pass.pass_type_id).await? else {
        return Ok(None);
    };
    let Some(program) = find_program(conn, pass_type.program_id).await? else {
        return Ok(None);
    };
    Ok(Some((pass_type, program)))
}
