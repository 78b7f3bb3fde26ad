//! Member role row as read from the host's roles/member_roles tables

use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct HeldRoleModel {
    pub role_id: i64,
    pub is_default: bool,
}
