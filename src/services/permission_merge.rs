//! Read-only role permission table

use std::collections::{HashMap, HashSet};

use crate::models::{MergedResourcePermissions, ResourceNode, RolePermissionResponse, STANDARD_PERMISSION_CODES};
use crate::services::resource_tree::walk_preorder;

/// Flatten the tree and flag which standard codes the role has on each resource
///
/// Only presence in `permission_codes` counts; an explicit DENY is not
/// represented at this layer.
pub fn merge_role_permissions(
    resources: &[ResourceNode],
    response: &RolePermissionResponse,
) -> Vec<MergedResourcePermissions> {
    let mut granted: HashMap<&str, HashSet<&str>> = HashMap::new();
    for grant in &response.permissions {
        granted
            .entry(grant.resource_key.as_str())
            .or_default()
            .extend(grant.permission_codes.iter().map(String::as_str));
    }

    walk_preorder(resources)
        .map(|node| {
            let codes = granted.get(node.resource_key.as_str());
            let permissions = STANDARD_PERMISSION_CODES
                .iter()
                .map(|code| {
                    let has = codes.is_some_and(|set| set.contains(code));
                    (code.to_string(), has)
                })
                .collect();

            MergedResourcePermissions {
                resource_key: node.resource_key.clone(),
                resource_name: node.resource_name.clone(),
                permissions,
            }
        })
        .collect()
}
