//! 测试辅助：内存 SQLite + 真实迁移，以及常用数据构造

use crate::config::CodeConfig;
use crate::entities::{
    ProgramStatus, pass_type_entity as pass_types, program_entity as programs,
    user_entity as users,
};
use crate::models::{CurrentUser, Role};
use crate::services::{
    CodeIssuer, PassService, PassValidationService, ProgramService, UserService,
};
use crate::utils::InventoryLocks;
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use uuid::Uuid;

/// 单连接的内存数据库（多个连接会各自拥有独立的内存库）
pub async fn setup_test_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options)
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

/// 共享同一组锁的服务集合
pub struct TestServices {
    pub db: DatabaseConnection,
    pub users: UserService,
    pub programs: ProgramService,
    pub passes: PassService,
    pub validations: PassValidationService,
}

pub async fn setup_services() -> TestServices {
    setup_services_with_issuer(CodeIssuer::new(CodeConfig::default())).await
}

pub async fn setup_services_with_issuer(code_issuer: CodeIssuer) -> TestServices {
    let db = setup_test_db().await;
    let locks = InventoryLocks::default();
    TestServices {
        users: UserService::new(db.clone()),
        programs: ProgramService::new(db.clone(), locks.clone()),
        passes: PassService::new(db.clone(), code_issuer, locks.clone()),
        validations: PassValidationService::new(db.clone(), locks),
        db,
    }
}

pub async fn create_test_user(db: &DatabaseConnection, name: &str) -> users::Model {
    let now = Utc::now();
    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(format!("{name}@example.com")),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn create_test_program(
    db: &DatabaseConnection,
    organizer_id: Uuid,
    name: &str,
    status: ProgramStatus,
) -> programs::Model {
    let now = Utc::now();
    programs::ActiveModel {
        id: Set(Uuid::new_v4()),
        organizer_id: Set(organizer_id),
        name: Set(name.to_string()),
        venue: Set("Main Hall".to_string()),
        start_time: Set(now + Duration::days(7)),
        end_time: Set(now + Duration::days(7) + Duration::hours(6)),
        registration_start: Set(None),
        registration_end: Set(None),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert program")
}

pub async fn create_test_pass_type(
    db: &DatabaseConnection,
    program_id: Uuid,
    total_available: Option<i32>,
) -> pass_types::Model {
    let now = Utc::now();
    pass_types::ActiveModel {
        id: Set(Uuid::new_v4()),
        program_id: Set(program_id),
        name: Set("General".to_string()),
        price_cents: Set(2500),
        description: Set(None),
        total_available: Set(total_available),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert pass type")
}

pub fn current_user(user: &users::Model, roles: &[Role]) -> CurrentUser {
    CurrentUser {
        id: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        roles: roles.to_vec(),
    }
}
