use crate::entities::{ProgramStatus, pass_type_entity as pass_types, program_entity as programs};
use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateProgramRequest, PageQuery, PaginatedResponse, PaginationParams, PassTypeResponse,
    ProgramDetailResponse, ProgramPageResponse, ProgramResponse, PublishedPassTypeResponse,
    PublishedProgramDetailResponse, PublishedProgramPageResponse, PublishedProgramQuery,
    PublishedProgramResponse, UpdateProgramRequest,
};
use crate::store::inventory;
use crate::utils::{InventoryLocks, KeyedGuard};
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProgramService {
    pool: DatabaseConnection,
    locks: InventoryLocks,
}

impl ProgramService {
    pub fn new(pool: DatabaseConnection, locks: InventoryLocks) -> Self {
        Self { pool, locks }
    }

    /// 创建活动及其票种
    pub async fn create_program(
        &self,
        organizer_id: Uuid,
        request: CreateProgramRequest,
    ) -> AppResult<ProgramDetailResponse> {
        request.validate()?;

        let txn = self.pool.begin().await?;

        if users::Entity::find_by_id(organizer_id).one(&txn).await?.is_none() {
            return Err(AppError::UserNotFound(organizer_id));
        }

        let now = Utc::now();
        let program = programs::ActiveModel {
            id: Set(Uuid::new_v4()),
            organizer_id: Set(organizer_id),
            name: Set(request.name.trim().to_string()),
            venue: Set(request.venue.trim().to_string()),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            registration_start: Set(request.registration_start),
            registration_end: Set(request.registration_end),
            status: Set(request.status),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for pt in request.pass_types {
            pass_types::ActiveModel {
                id: Set(Uuid::new_v4()),
                program_id: Set(program.id),
                name: Set(pt.name.trim().to_string()),
                price_cents: Set(pt.price_cents),
                description: Set(pt.description),
                total_available: Set(pt.total_available),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        let detail = program_detail(&txn, program).await?;
        txn.commit().await?;

        log::info!(
            "Program {} created by {organizer_id} with {} pass type(s)",
            detail.program.id,
            detail.pass_types.len()
        );
        Ok(detail)
    }

    /// 分页获取主办方自己的活动（按创建时间倒序）
    pub async fn list_programs_for_organizer(
        &self,
        organizer_id: Uuid,
        query: &PageQuery,
    ) -> AppResult<ProgramPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);
        let base_query =
            programs::Entity::find().filter(programs::Column::OrganizerId.eq(organizer_id));

        let total = base_query.clone().count(&self.pool).await?;
        let items = base_query
            .order_by_desc(programs::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(ProgramResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn get_program_for_organizer(
        &self,
        organizer_id: Uuid,
        program_id: Uuid,
    ) -> AppResult<ProgramDetailResponse> {
        let program = self.owned_program(organizer_id, program_id).await?;
        program_detail(&self.pool, program).await
    }

    /// 更新活动并同步票种
    /// - 请求体 id 必须与路径 id 一致
    /// - 带 id 的票种更新，不带 id 的新建，未列出的删除
    /// - 已有票据的票种不能删除；缩减库存只影响之后的购票
    pub async fn update_program_for_organizer(
        &self,
        organizer_id: Uuid,
        program_id: Uuid,
        request: UpdateProgramRequest,
    ) -> AppResult<ProgramDetailResponse> {
        if request.id != program_id {
            return Err(AppError::ValidationError(
                "Program ID in body does not match path".to_string(),
            ));
        }
        request.validate()?;

        let _program_guard = self.locks.programs.lock(program_id).await;
        let program = self.owned_program(organizer_id, program_id).await?;

        // 与购票互斥，避免删除票种时有新票写入
        let existing = inventory::pass_types_for_program(&self.pool, program_id).await?;
        let _pass_type_guards = self.lock_pass_types(&existing).await;

        let txn = self.pool.begin().await?;
        let existing: HashMap<Uuid, pass_types::Model> =
            inventory::pass_types_for_program_with_lock(&txn, program_id)
                .await?
                .into_iter()
                .map(|pt| (pt.id, pt))
                .collect();

        let now = Utc::now();
        let mut kept = HashSet::new();
        for pt in request.pass_types {
            match pt.id {
                Some(id) => {
                    let current = existing
                        .get(&id)
                        .cloned()
                        .ok_or(AppError::PassTypeNotFound(id))?;
                    kept.insert(id);
                    let mut am = current.into_active_model();
                    am.name = Set(pt.name.trim().to_string());
                    am.price_cents = Set(pt.price_cents);
                    am.description = Set(pt.description);
                    am.total_available = Set(pt.total_available);
                    am.updated_at = Set(now);
                    am.update(&txn).await?;
                }
                None => {
                    pass_types::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        program_id: Set(program_id),
                        name: Set(pt.name.trim().to_string()),
                        price_cents: Set(pt.price_cents),
                        description: Set(pt.description),
                        total_available: Set(pt.total_available),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(&txn)
                    .await?;
                }
            }
        }

        for (id, pt) in existing {
            if kept.contains(&id) {
                continue;
            }
            if inventory::count_passes_for_type(&txn, id).await? > 0 {
                return Err(AppError::ValidationError(format!(
                    "Pass type '{}' already has passes and cannot be removed",
                    pt.name
                )));
            }
            pt.delete(&txn).await?;
        }

        let mut am = program.into_active_model();
        am.name = Set(request.name.trim().to_string());
        am.venue = Set(request.venue.trim().to_string());
        am.start_time = Set(request.start_time);
        am.end_time = Set(request.end_time);
        am.registration_start = Set(request.registration_start);
        am.registration_end = Set(request.registration_end);
        am.status = Set(request.status);
        am.updated_at = Set(now);
        let program = am.update(&txn).await?;

        let detail = program_detail(&txn, program).await?;
        txn.commit().await?;

        log::info!("Program {program_id} updated by {organizer_id}");
        Ok(detail)
    }

    /// 删除活动，级联删除票种、票据、二维码与核验记录
    pub async fn delete_program_for_organizer(
        &self,
        organizer_id: Uuid,
        program_id: Uuid,
    ) -> AppResult<()> {
        let _program_guard = self.locks.programs.lock(program_id).await;
        let program = self.owned_program(organizer_id, program_id).await?;
        program.delete(&self.pool).await?;
        log::info!("Program {program_id} deleted by {organizer_id}");
        Ok(())
    }

    /// 公开活动列表，可按名称或场地搜索
    pub async fn list_published_programs(
        &self,
        query: &PublishedProgramQuery,
    ) -> AppResult<PublishedProgramPageResponse> {
        let params = PaginationParams::new(query.page, query.per_page);

        let mut base_query =
            programs::Entity::find().filter(programs::Column::Status.eq(ProgramStatus::Published));
        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            base_query = base_query.filter(search_condition(q));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let items = base_query
            .order_by_asc(programs::Column::StartTime)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?
            .into_iter()
            .map(PublishedProgramResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn get_published_program(
        &self,
        program_id: Uuid,
    ) -> AppResult<PublishedProgramDetailResponse> {
        let program = inventory::find_program(&self.pool, program_id)
            .await?
            .filter(|p| p.status == ProgramStatus::Published)
            .ok_or(AppError::ProgramNotFound(program_id))?;

        let pass_types = inventory::pass_types_for_program(&self.pool, program.id).await?;
        let ids: Vec<Uuid> = pass_types.iter().map(|pt| pt.id).collect();
        let sold = inventory::count_passes_by_type(&self.pool, &ids).await?;

        let registration_start = program.registration_start;
        let registration_end = program.registration_end;
        Ok(PublishedProgramDetailResponse {
            program: program.into(),
            registration_start,
            registration_end,
            pass_types: pass_types
                .into_iter()
                .map(|pt| {
                    let n = sold.get(&pt.id).copied().unwrap_or(0);
                    PublishedPassTypeResponse::from_model(pt, n)
                })
                .collect(),
        })
    }

    async fn owned_program(
        &self,
        organizer_id: Uuid,
        program_id: Uuid,
    ) -> AppResult<programs::Model> {
        inventory::find_program(&self.pool, program_id)
            .await?
            .filter(|p| p.organizer_id == organizer_id)
            .ok_or(AppError::ProgramNotFound(program_id))
    }

    /// 按 id 排序依次加锁，避免多把锁之间死锁
    async fn lock_pass_types(&self, pass_types: &[pass_types::Model]) -> Vec<KeyedGuard> {
        let mut ids: Vec<Uuid> = pass_types.iter().map(|pt| pt.id).collect();
        ids.sort();
        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.locks.pass_types.lock(id).await);
        }
        guards
    }
}

async fn program_detail<C: ConnectionTrait>(
    conn: &C,
    program: programs::Model,
) -> AppResult<ProgramDetailResponse> {
    let pass_types = inventory::pass_types_for_program(conn, program.id).await?;
    let ids: Vec<Uuid> = pass_types.iter().map(|pt| pt.id).collect();
    let sold = inventory::count_passes_by_type(conn, &ids).await?;

    Ok(ProgramDetailResponse {
        program: program.into(),
        pass_types: pass_types
            .into_iter()
            .map(|pt| {
                let n = sold.get(&pt.id).copied().unwrap_or(0);
                PassTypeResponse::from_model(pt, n)
            })
            .collect(),
    })
}

/// 名称或场地包含关键字（不区分大小写）
fn search_condition(q: &str) -> Condition {
    let escaped = q
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = format!("%{escaped}%");

    Condition::any()
        .add(
            Expr::expr(Func::lower(Expr::col((programs::Entity, programs::Column::Name))))
                .like(LikeExpr::new(pattern.clone()).escape('\\')),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((programs::Entity, programs::Column::Venue))))
                .like(LikeExpr::new(pattern).escape('\\')),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreatePassTypeRequest, UpdatePassTypeRequest};
    use crate::test_utils::*;
    use chrono::Duration;

    fn create_request(name: &str, venue: &str, status: ProgramStatus) -> CreateProgramRequest {
        let start = Utc::now() + Duration::days(10);
        CreateProgramRequest {
            name: name.to_string(),
            venue: venue.to_string(),
            start_time: start,
            end_time: start + Duration::hours(4),
            registration_start: None,
            registration_end: None,
            status,
            pass_types: vec![
                CreatePassTypeRequest {
                    name: "General".to_string(),
                    price_cents: 1500,
                    description: None,
                    total_available: Some(2),
                },
                CreatePassTypeRequest {
                    name: "VIP".to_string(),
                    price_cents: 9000,
                    description: Some("Front row".to_string()),
                    total_available: None,
                },
            ],
        }
    }

    fn update_request(detail: &ProgramDetailResponse) -> UpdateProgramRequest {
        UpdateProgramRequest {
            id: detail.program.id,
            name: detail.program.name.clone(),
            venue: detail.program.venue.clone(),
            start_time: detail.program.start_time,
            end_time: detail.program.end_time,
            registration_start: None,
            registration_end: None,
            status: detail.program.status,
            pass_types: detail
                .pass_types
                .iter()
                .map(|pt| UpdatePassTypeRequest {
                    id: Some(pt.id),
                    name: pt.name.clone(),
                    price_cents: pt.price_cents,
                    description: pt.description.clone(),
                    total_available: pt.total_available,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_program() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;

        let created = s
            .programs
            .create_program(
                organizer.id,
                create_request("Jazz Night", "Blue Room", ProgramStatus::Draft),
            )
            .await
            .unwrap();
        assert_eq!(created.pass_types.len(), 2);

        let fetched = s
            .programs
            .get_program_for_organizer(organizer.id, created.program.id)
            .await
            .unwrap();
        assert_eq!(fetched.program.name, "Jazz Night");
        assert!(fetched.pass_types.iter().all(|pt| pt.sold == 0));

        let stranger = create_test_user(&s.db, "stranger").await;
        assert!(matches!(
            s.programs
                .get_program_for_organizer(stranger.id, created.program.id)
                .await,
            Err(AppError::ProgramNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_requires_matching_id() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        let created = s
            .programs
            .create_program(organizer.id, create_request("A", "B", ProgramStatus::Draft))
            .await
            .unwrap();

        let mut request = update_request(&created);
        request.id = Uuid::new_v4();
        assert!(matches!(
            s.programs
                .update_program_for_organizer(organizer.id, created.program.id, request)
                .await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_update_syncs_pass_types() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        let created = s
            .programs
            .create_program(organizer.id, create_request("A", "B", ProgramStatus::Draft))
            .await
            .unwrap();

        let mut request = update_request(&created);
        request.name = "Renamed".to_string();
        // 删除 VIP，修改 General，新增 Student
        request.pass_types.retain(|pt| pt.name == "General");
        request.pass_types[0].price_cents = 2000;
        request.pass_types.push(UpdatePassTypeRequest {
            id: None,
            name: "Student".to_string(),
            price_cents: 500,
            description: None,
            total_available: Some(50),
        });

        let updated = s
            .programs
            .update_program_for_organizer(organizer.id, created.program.id, request)
            .await
            .unwrap();

        assert_eq!(updated.program.name, "Renamed");
        let mut names: Vec<_> = updated.pass_types.iter().map(|pt| pt.name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["General", "Student"]);
        let general = updated
            .pass_types
            .iter()
            .find(|pt| pt.name == "General")
            .unwrap();
        assert_eq!(general.price_cents, 2000);
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_pass_type() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        let created = s
            .programs
            .create_program(organizer.id, create_request("A", "B", ProgramStatus::Draft))
            .await
            .unwrap();

        let mut request = update_request(&created);
        let bogus = Uuid::new_v4();
        request.pass_types[0].id = Some(bogus);
        assert!(matches!(
            s.programs
                .update_program_for_organizer(organizer.id, created.program.id, request)
                .await,
            Err(AppError::PassTypeNotFound(id)) if id == bogus
        ));
    }

    #[tokio::test]
    async fn test_cannot_remove_pass_type_with_passes() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        let buyer = create_test_user(&s.db, "buyer").await;
        let created = s
            .programs
            .create_program(organizer.id, create_request("A", "B", ProgramStatus::Published))
            .await
            .unwrap();
        let vip = created
            .pass_types
            .iter()
            .find(|pt| pt.name == "VIP")
            .unwrap()
            .id;
        s.passes
            .purchase_pass(buyer.id, created.program.id, vip)
            .await
            .unwrap();

        let mut request = update_request(&created);
        request.pass_types.retain(|pt| pt.id != Some(vip));
        assert!(matches!(
            s.programs
                .update_program_for_organizer(organizer.id, created.program.id, request)
                .await,
            Err(AppError::ValidationError(_))
        ));

        let detail = s
            .programs
            .get_program_for_organizer(organizer.id, created.program.id)
            .await
            .unwrap();
        assert_eq!(detail.pass_types.len(), 2);
    }

    #[tokio::test]
    async fn test_shrinking_capacity_is_forward_only() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        let buyer = create_test_user(&s.db, "buyer").await;
        let created = s
            .programs
            .create_program(organizer.id, create_request("A", "B", ProgramStatus::Published))
            .await
            .unwrap();
        let general = created
            .pass_types
            .iter()
            .find(|pt| pt.name == "General")
            .unwrap()
            .id;
        for _ in 0..2 {
            s.passes
                .purchase_pass(buyer.id, created.program.id, general)
                .await
                .unwrap();
        }

        let mut request = update_request(&created);
        for pt in request.pass_types.iter_mut() {
            if pt.id == Some(general) {
                pt.total_available = Some(1);
            }
        }
        let updated = s
            .programs
            .update_program_for_organizer(organizer.id, created.program.id, request)
            .await
            .unwrap();

        let general_view = updated
            .pass_types
            .iter()
            .find(|pt| pt.id == general)
            .unwrap();
        assert_eq!(general_view.sold, 2);
        assert_eq!(general_view.remaining, Some(0));
        assert!(matches!(
            s.passes
                .purchase_pass(buyer.id, created.program.id, general)
                .await,
            Err(AppError::PassSoldOut)
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        let buyer = create_test_user(&s.db, "buyer").await;
        let staff = create_test_user(&s.db, "staff").await;
        let created = s
            .programs
            .create_program(organizer.id, create_request("A", "B", ProgramStatus::Published))
            .await
            .unwrap();
        let pass_type_id = created.pass_types[0].id;
        let purchased = s
            .passes
            .purchase_pass(buyer.id, created.program.id, pass_type_id)
            .await
            .unwrap();
        s.validations
            .validate_by_qr(staff.id, created.program.id, purchased.qr_code_id)
            .await
            .unwrap();

        s.programs
            .delete_program_for_organizer(organizer.id, created.program.id)
            .await
            .unwrap();

        use crate::entities::{pass_entity, pass_validation_entity, qr_code_entity};
        assert_eq!(pass_types::Entity::find().count(&s.db).await.unwrap(), 0);
        assert_eq!(pass_entity::Entity::find().count(&s.db).await.unwrap(), 0);
        assert_eq!(qr_code_entity::Entity::find().count(&s.db).await.unwrap(), 0);
        assert_eq!(
            pass_validation_entity::Entity::find()
                .count(&s.db)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_published_listing_and_search() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        for (name, venue, status) in [
            ("Rock Festival", "Riverside Park", ProgramStatus::Published),
            ("Poetry Evening", "City Library", ProgramStatus::Published),
            ("Secret Rehearsal", "Riverside Park", ProgramStatus::Draft),
        ] {
            s.programs
                .create_program(organizer.id, create_request(name, venue, status))
                .await
                .unwrap();
        }

        let all = s
            .programs
            .list_published_programs(&PublishedProgramQuery::default())
            .await
            .unwrap();
        assert_eq!(all.total, 2);

        let by_venue = s
            .programs
            .list_published_programs(&PublishedProgramQuery {
                q: Some("riverside".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_venue.total, 1);
        assert_eq!(by_venue.data[0].name, "Rock Festival");

        let by_name = s
            .programs
            .list_published_programs(&PublishedProgramQuery {
                q: Some("POETRY".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.total, 1);

        let wildcard = s
            .programs
            .list_published_programs(&PublishedProgramQuery {
                q: Some("%".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(wildcard.total, 0);
    }

    #[tokio::test]
    async fn test_published_detail_shows_availability() {
        let s = setup_services().await;
        let organizer = create_test_user(&s.db, "organizer").await;
        let buyer = create_test_user(&s.db, "buyer").await;
        let draft = s
            .programs
            .create_program(organizer.id, create_request("Draft", "X", ProgramStatus::Draft))
            .await
            .unwrap();
        let published = s
            .programs
            .create_program(organizer.id, create_request("Live", "Y", ProgramStatus::Published))
            .await
            .unwrap();

        assert!(matches!(
            s.programs.get_published_program(draft.program.id).await,
            Err(AppError::ProgramNotFound(_))
        ));

        let general = published
            .pass_types
            .iter()
            .find(|pt| pt.name == "General")
            .unwrap()
            .id;
        for _ in 0..2 {
            s.passes
                .purchase_pass(buyer.id, published.program.id, general)
                .await
                .unwrap();
        }

        let detail = s
            .programs
            .get_published_program(published.program.id)
            .await
            .unwrap();
        let general_view = detail.pass_types.iter().find(|pt| pt.id == general).unwrap();
        assert!(general_view.sold_out);
        assert_eq!(general_view.remaining, Some(0));
        let vip_view = detail.pass_types.iter().find(|pt| pt.name == "VIP").unwrap();
        assert!(!vip_view.sold_out);
        assert_eq!(vip_view.remaining, None);
    }
}
