use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::CurrentUser;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set, SqlErr};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
}

impl UserService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 确保本地用户存在（首次访问时按令牌信息创建，之后同步名称与邮箱）
    pub async fn ensure_user(&self, current: &CurrentUser) -> AppResult<users::Model> {
        if let Some(existing) = users::Entity::find_by_id(current.id).one(&self.pool).await? {
            if existing.name == current.name && existing.email == current.email {
                return Ok(existing);
            }
            let mut am = existing.into_active_model();
            am.name = Set(current.name.clone());
            am.email = Set(current.email.clone());
            am.updated_at = Set(Utc::now());
            return Ok(am.update(&self.pool).await?);
        }

        let now = Utc::now();
        let inserted = users::ActiveModel {
            id: Set(current.id),
            name: Set(current.name.clone()),
            email: Set(current.email.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.pool)
        .await;

        match inserted {
            Ok(user) => {
                log::info!("Provisioned user {}", user.id);
                Ok(user)
            }
            // 并发的首次请求已经创建了该用户
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                self.get_user(current.id).await
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_user(&self, user_id: Uuid) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or(AppError::UserNotFound(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::test_utils::setup_test_db;

    fn token_user(name: &str) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{name}@example.com"),
            roles: vec![Role::Attendee],
        }
    }

    #[tokio::test]
    async fn test_ensure_user_creates_once() {
        let service = UserService::new(setup_test_db().await);
        let current = token_user("carol");

        let first = service.ensure_user(&current).await.unwrap();
        let second = service.ensure_user(&current).await.unwrap();

        assert_eq!(first.id, current.id);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_ensure_user_syncs_profile() {
        let service = UserService::new(setup_test_db().await);
        let mut current = token_user("dave");
        service.ensure_user(&current).await.unwrap();

        current.email = "dave@new.example.com".to_string();
        let updated = service.ensure_user(&current).await.unwrap();
        assert_eq!(updated.email, "dave@new.example.com");
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let service = UserService::new(setup_test_db().await);
        let id = Uuid::new_v4();
        assert!(matches!(
            service.get_user(id).await,
            Err(AppError::UserNotFound(missing)) if missing == id
        ));
    }
}
