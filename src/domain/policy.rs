//! Authorization rules for acting on user records.

use uuid::Uuid;

use super::UserRole;
use crate::errors::{AppError, AppResult};

/// Admins may act on any record; everyone else only on their own.
pub fn can_access(requester_id: Uuid, requester_role: UserRole, target_id: Uuid) -> bool {
    requester_role.is_admin() || requester_id == target_id
}

/// Gate for admin-only operations.
pub fn require_admin(role: UserRole) -> AppResult<()> {
    if role.is_admin() {
        Ok(())
    } else {
        Err(AppError::AdminRequired)
    }
}
