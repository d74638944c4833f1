use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::users;

pub fn require_admin(user: &users::Model) -> Result<(), ServiceError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden("Admin access required".into()))
    }
}

/// Allow the user themself or an admin.
pub fn require_self_or_admin(user: &users::Model, target: Uuid) -> Result<(), ServiceError> {
    if user.id == target || user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "You can only view your own submission history".into(),
        ))
    }
}
