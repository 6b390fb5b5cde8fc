use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::enums::user_roles::UserRole;

/// Authenticated caller, resolved by the transport layer and handed to every use case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }
}
