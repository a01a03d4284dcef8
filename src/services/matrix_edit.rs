//! Recorded matrix edits
//!
//! Edits are plain data so an edit log can be stored, sent, and replayed
//! against a fresh snapshot.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{PermissionEffect, ResourceNode};
use crate::services::permission_matrix::PermissionMatrixState;
use crate::services::resource_tree::find_resource;
use crate::utils::error::{MatrixError, MatrixResult};

/// One edit to a permission matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MatrixEdit {
    /// Set a single cell
    Set {
        resource_key: String,
        code: String,
        effect: PermissionEffect,
    },
    /// Cycle a single cell
    Toggle { resource_key: String, code: String },
    /// Replace one resource's grants
    Row {
        resource_key: String,
        codes: Vec<String>,
        effect: PermissionEffect,
    },
    /// Drop every grant of one resource
    ClearRow { resource_key: String },
    /// Set one code across resources
    Column {
        code: String,
        resource_keys: Vec<String>,
        effect: PermissionEffect,
    },
    /// Replace the grants of many resources
    All {
        resource_keys: Vec<String>,
        codes: Vec<String>,
        effect: PermissionEffect,
    },
    /// Set codes on a resource and its descendants
    Subtree {
        resource_key: String,
        codes: Vec<String>,
        effect: PermissionEffect,
    },
    /// Discard every edit so far
    Reset,
}

impl MatrixEdit {
    /// Short operation name
    pub fn name(&self) -> &'static str {
        match self {
            MatrixEdit::Set { .. } => "set",
            MatrixEdit::Toggle { .. } => "toggle",
            MatrixEdit::Row { .. } => "row",
            MatrixEdit::ClearRow { .. } => "clear_row",
            MatrixEdit::Column { .. } => "column",
            MatrixEdit::All { .. } => "all",
            MatrixEdit::Subtree { .. } => "subtree",
            MatrixEdit::Reset => "reset",
        }
    }

    /// Apply this edit, returning the new state
    pub fn apply(&self, state: &PermissionMatrixState, tree: &[ResourceNode]) -> PermissionMatrixState {
        match self {
            MatrixEdit::Set {
                resource_key,
                code,
                effect,
            } => state.set_permission_effect(resource_key, code, *effect),
            MatrixEdit::Toggle { resource_key, code } => {
                state.toggle_permission_effect(resource_key, code)
            }
            MatrixEdit::Row {
                resource_key,
                codes,
                effect,
            } => state.apply_row_permissions(resource_key, codes, *effect),
            MatrixEdit::ClearRow { resource_key } => state.clear_row(resource_key),
            MatrixEdit::Column {
                code,
                resource_keys,
                effect,
            } => state.apply_column_permissions(code, resource_keys, *effect),
            MatrixEdit::All {
                resource_keys,
                codes,
                effect,
            } => state.apply_all_permissions(resource_keys, codes, *effect),
            MatrixEdit::Subtree {
                resource_key,
                codes,
                effect,
            } => {
                if find_resource(tree, resource_key).is_none() {
                    warn!(resource_key = %resource_key, "Subtree edit names a resource outside the tree");
                }
                state.apply_to_resource_and_children(resource_key, codes, *effect, tree)
            }
            MatrixEdit::Reset => state.reset(),
        }
    }
}

/// Replay edits left to right
pub fn apply_edits(
    state: &PermissionMatrixState,
    edits: &[MatrixEdit],
    tree: &[ResourceNode],
) -> PermissionMatrixState {
    let result = edits
        .iter()
        .fold(state.clone(), |acc, edit| edit.apply(&acc, tree));
    debug!(edits = edits.len(), dirty = result.is_dirty(), "Applied matrix edits");
    result
}

/// Reject subtree edits rooted at a resource missing from the tree
///
/// Other edits create grants on demand, so any resource key is accepted.
pub fn validate_edits(edits: &[MatrixEdit], tree: &[ResourceNode]) -> MatrixResult<()> {
    for edit in edits {
        if let MatrixEdit::Subtree { resource_key, .. } = edit {
            if find_resource(tree, resource_key).is_none() {
                return Err(MatrixError::UnknownResource(format!(
                    "{} (in '{}' edit)",
                    resource_key,
                    edit.name()
                )));
            }
        }
    }
    Ok(())
}
