use crate::entities::user_entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// 业务角色（来自令牌 realm_access.roles）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Organizer,
    Staff,
    Attendee,
}

impl Role {
    pub fn from_claim(value: &str) -> Option<Self> {
        // 兼容 ROLE_ 前缀
        let value = value.strip_prefix("ROLE_").unwrap_or(value);
        match value.to_ascii_uppercase().as_str() {
            "ORGANIZER" => Some(Role::Organizer),
            "STAFF" => Some(Role::Staff),
            "ATTENDEE" => Some(Role::Attendee),
            _ => None,
        }
    }
}

/// 鉴权中间件注入到请求扩展中的当前用户
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<Role>,
}

impl CurrentUser {
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(m: user_entity::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_claim() {
        assert_eq!(Role::from_claim("ORGANIZER"), Some(Role::Organizer));
        assert_eq!(Role::from_claim("ROLE_STAFF"), Some(Role::Staff));
        assert_eq!(Role::from_claim("staff"), Some(Role::Staff));
        assert_eq!(Role::from_claim("offline_access"), None);
    }
}
