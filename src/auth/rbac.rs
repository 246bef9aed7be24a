//! Role-based access control.
//!
//! Roles are resolved to a permission set once, when a token is issued; the
//! request boundary then checks the typed permission strings instead of
//! scattering role comparisons through handlers.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

/// Permission string constants for compile-time safety
pub mod consts {
    pub const CLIENTS_WRITE: &str = "clients:write";
    pub const CLIENTS_DELETE: &str = "clients:delete";

    pub const INVENTORY_WRITE: &str = "inventory:write";
    pub const INVENTORY_DELETE: &str = "inventory:delete";

    pub const ORDERS_WRITE: &str = "orders:write";
    pub const ORDERS_DELETE: &str = "orders:delete";
}

lazy_static! {
    pub static ref ROLES: HashMap<String, Role> = {
        let mut roles = HashMap::new();

        roles.insert(
            "admin".to_string(),
            Role {
                name: "admin".to_string(),
                description: "Administrator with full access".to_string(),
                permissions: vec![
                    "clients:*".to_string(),
                    "inventory:*".to_string(),
                    "orders:*".to_string(),
                    "users:*".to_string(),
                ],
            },
        );

        // Mechanics manage day-to-day work but cannot delete records.
        roles.insert(
            "mechanic".to_string(),
            Role {
                name: "mechanic".to_string(),
                description: "Shop-floor staff: read and write, no deletes".to_string(),
                permissions: vec![
                    "clients:read".to_string(),
                    "clients:write".to_string(),
                    "inventory:read".to_string(),
                    "inventory:write".to_string(),
                    "orders:read".to_string(),
                    "orders:write".to_string(),
                ],
            },
        );

        roles
    };
}

/// Resolves a role name to its permission set. Unknown roles get no
/// permissions.
pub fn permissions_for_role(role: &str) -> Vec<String> {
    ROLES
        .get(role)
        .map(|r| r.permissions.clone())
        .unwrap_or_default()
}

/// Checks a permission against a granted set, honoring `resource:*`
/// wildcards.
pub fn permission_matches(granted: &[String], required: &str) -> bool {
    if granted.iter().any(|p| p == required) {
        return true;
    }
    if let Some((resource, _action)) = required.split_once(':') {
        let wildcard = format!("{}:*", resource);
        return granted.iter().any(|p| *p == wildcard);
    }
    false
}
