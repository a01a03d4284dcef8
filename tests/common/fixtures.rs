//! Test fixtures for common test data
//!
//! Fixtures provide a small but realistic admin console catalog and a role's
//! grants on it, shared across integration tests.

use permission_matrix::models::{
    PermissionEffect, ResourceNode, ResourcePermissionGrant, ResourceType, RolePermissionResponse,
};

/// Resource keys used by the catalog fixture
pub mod keys {
    pub const ADMIN: &str = "menu.admin";
    pub const USERS: &str = "menu.admin.users";
    pub const USER_CREATE: &str = "button.admin.users.create";
    pub const USER_DELETE: &str = "button.admin.users.delete";
    pub const ROLES: &str = "menu.admin.roles";
    pub const USERS_API: &str = "api.admin.users";
    pub const AGENT: &str = "menu.agent";
    pub const AGENT_CHAT: &str = "menu.agent.chat";
}

/// Resource catalog fixtures
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// Flat catalog in backend order (unsorted, children before parents)
    pub fn flat() -> Vec<ResourceNode> {
        vec![
            node("11", keys::USERS, "Users", ResourceType::Menu, Some("1"), Some(1)),
            node("111", keys::USER_CREATE, "Create user", ResourceType::Button, Some("11"), Some(1)),
            node("112", keys::USER_DELETE, "Delete user", ResourceType::Button, Some("11"), Some(2)),
            node("113", keys::USERS_API, "Users API", ResourceType::Api, Some("11"), None),
            node("12", keys::ROLES, "Roles", ResourceType::Menu, Some("1"), Some(2)),
            node("2", keys::AGENT, "Agent workspace", ResourceType::Menu, None, Some(2)),
            node("21", keys::AGENT_CHAT, "Chat", ResourceType::Menu, Some("2"), None),
            node("1", keys::ADMIN, "Administration", ResourceType::Menu, None, Some(1)),
        ]
    }

    /// A role that can see the admin area and create users, but not delete them
    pub fn role_response() -> RolePermissionResponse {
        RolePermissionResponse {
            permissions: vec![
                ResourcePermissionGrant::allow(keys::ADMIN, &["VIEW"]),
                ResourcePermissionGrant::allow(keys::USERS, &["VIEW", "EDIT"]),
                ResourcePermissionGrant::allow(keys::USER_CREATE, &["USE"]),
                ResourcePermissionGrant::allow(keys::USER_DELETE, &["USE"])
                    .with_effect(PermissionEffect::Deny),
            ],
        }
    }

    /// The diff/preview code universe
    pub fn codes() -> Vec<String> {
        ["VIEW", "USE", "EDIT", "DELETE", "APPROVE", "EXECUTE"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }
}

/// Build a flat resource node
pub fn node(
    id: &str,
    key: &str,
    name: &str,
    resource_type: ResourceType,
    parent: Option<&str>,
    sort_order: Option<i64>,
) -> ResourceNode {
    ResourceNode {
        id: id.to_string(),
        resource_key: key.to_string(),
        resource_name: name.to_string(),
        resource_type,
        parent_id: parent.map(String::from),
        sort_order,
        enabled: true,
        children: vec![],
    }
}

/// Owned code list from string slices
pub fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}
