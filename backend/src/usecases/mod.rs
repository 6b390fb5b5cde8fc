pub mod driver_orders;
pub mod ledger;
pub mod notifications;
pub mod orders;
pub mod pricing;
pub mod ratings;

#[cfg(test)]
pub(crate) mod test_support;

use crates::domain::value_objects::enums::user_roles::UserRole;

/// Roles allowed on the driver surface. Admins may act on it too.
pub const DRIVER_ROLES: [UserRole; 3] = [UserRole::Driver, UserRole::Admin, UserRole::SuperAdmin];

pub const ADMIN_ROLES: [UserRole; 2] = [UserRole::Admin, UserRole::SuperAdmin];
