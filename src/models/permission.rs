//! Permission grant models and wire shapes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Permission codes shown by the read-only role permission table
pub const STANDARD_PERMISSION_CODES: [&str; 6] =
    ["VIEW", "USE", "EDIT", "DELETE", "APPROVE", "EXECUTE"];

/// Tri-state grant value for a (resource, permission code) cell
///
/// `None` is never stored; it is what an absent cell means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionEffect {
    Allow,
    Deny,
    #[default]
    None,
}

impl PermissionEffect {
    /// Next value in the NONE -> ALLOW -> DENY -> NONE cycle
    pub fn cycle(self) -> Self {
        match self {
            PermissionEffect::None => PermissionEffect::Allow,
            PermissionEffect::Allow => PermissionEffect::Deny,
            PermissionEffect::Deny => PermissionEffect::None,
        }
    }

    /// Wire value for the diff payload: `None` means revoke
    pub fn as_grant(self) -> Option<PermissionEffect> {
        match self {
            PermissionEffect::None => None,
            effect => Some(effect),
        }
    }

    /// Whether this effect is stored explicitly
    pub fn is_set(self) -> bool {
        self != PermissionEffect::None
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionEffect::Allow => "ALLOW",
            PermissionEffect::Deny => "DENY",
            PermissionEffect::None => "NONE",
        }
    }
}

/// Granted codes for one resource, as returned by the role permission endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePermissionGrant {
    pub resource_key: String,
    #[serde(default)]
    pub permission_codes: Vec<String>,
    /// Omitted on the read path, which means ALLOW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<PermissionEffect>,
}

impl ResourcePermissionGrant {
    /// Grant the given codes with the implicit ALLOW effect
    pub fn allow(resource_key: impl Into<String>, codes: &[&str]) -> Self {
        Self {
            resource_key: resource_key.into(),
            permission_codes: codes.iter().map(|c| c.to_string()).collect(),
            effect: None,
        }
    }

    /// Grant the given codes with an explicit effect
    pub fn with_effect(mut self, effect: PermissionEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Role permissions as read from the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionResponse {
    #[serde(default)]
    pub permissions: Vec<ResourcePermissionGrant>,
}

/// One changed cell in a sync payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDiffItem {
    pub resource_key: String,
    pub permission_code: String,
    /// `None` serializes as `null` and revokes the grant
    pub effect: Option<PermissionEffect>,
}

/// Minimal change set sent back to the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionPayload {
    pub items: Vec<PermissionDiffItem>,
}

impl RolePermissionPayload {
    /// Whether the payload carries no changes
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Human-readable description of one changed cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionChangeItem {
    pub resource_key: String,
    pub permission_code: String,
    pub from: PermissionEffect,
    pub to: PermissionEffect,
}

/// Table row for the read-only role permission view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedResourcePermissions {
    pub resource_key: String,
    pub resource_name: String,
    pub permissions: BTreeMap<String, bool>,
}
