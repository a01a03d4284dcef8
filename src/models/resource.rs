//! Permissionable resource models

use serde::{Deserialize, Serialize};

/// Kinds of resources that can carry permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// Navigation menu entry
    Menu,
    /// Button or inline action inside a page
    Button,
    /// Backend API endpoint
    Api,
    /// Any other protected resource
    Resource,
}

impl ResourceType {
    /// Get all resource types
    pub fn all() -> Vec<ResourceType> {
        vec![
            ResourceType::Menu,
            ResourceType::Button,
            ResourceType::Api,
            ResourceType::Resource,
        ]
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Menu => "MENU",
            ResourceType::Button => "BUTTON",
            ResourceType::Api => "API",
            ResourceType::Resource => "RESOURCE",
        }
    }
}

/// A permissionable entity in the resource catalog
///
/// `resource_key` is the key used by the permission matrix; `id` and
/// `parent_id` only describe the tree shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    /// Unique identifier
    pub id: String,

    /// Stable dotted key (e.g. "menu.admin.users")
    pub resource_key: String,

    /// Human-readable name
    pub resource_name: String,

    /// Kind of resource
    pub resource_type: ResourceType,

    /// Parent node id, `None` for roots
    #[serde(default)]
    pub parent_id: Option<String>,

    /// Position among siblings; unordered nodes sort last
    #[serde(default)]
    pub sort_order: Option<i64>,

    /// Whether the resource is active
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Child nodes, populated by the tree builder
    #[serde(default)]
    pub children: Vec<ResourceNode>,
}

fn default_enabled() -> bool {
    true
}

impl ResourceNode {
    /// Create a root node with no children
    pub fn new(
        id: impl Into<String>,
        resource_key: impl Into<String>,
        resource_name: impl Into<String>,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            id: id.into(),
            resource_key: resource_key.into(),
            resource_name: resource_name.into(),
            resource_type,
            parent_id: None,
            sort_order: None,
            enabled: true,
            children: vec![],
        }
    }

    /// Set the parent id
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the sort order
    pub fn with_sort_order(mut self, sort_order: i64) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    /// Whether this node has children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
