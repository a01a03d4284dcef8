//! Role permission matrix editing
//!
//! A [`PermissionMatrixState`] holds two sparse resource x code grids: the
//! last synced `original` and the working `current`. Every edit returns a new
//! state. `original` is shared between all states derived from one snapshot,
//! the outer `current` map is always new, and per-resource grant maps are
//! copied only when an edit touches them, so unchanged rows keep their
//! identity across edits.
//!
//! Invariant: a resource present in either grid has at least one code with
//! an ALLOW or DENY effect. Absence means NONE.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::debug;

use crate::models::{
    PermissionChangeItem, PermissionDiffItem, PermissionEffect, ResourceNode,
    ResourcePermissionGrant, RolePermissionPayload, RolePermissionResponse,
};
use crate::services::resource_tree::descendant_keys;

/// Effects granted on one resource, keyed by permission code
pub type ResourceGrants = BTreeMap<String, PermissionEffect>;

/// Sparse grid of grants, keyed by resource key
pub type GrantMatrix = BTreeMap<String, Arc<ResourceGrants>>;

/// Next value in the NONE -> ALLOW -> DENY -> NONE cycle
pub fn cycle_state(effect: PermissionEffect) -> PermissionEffect {
    effect.cycle()
}

/// Editable permission matrix for one role
#[derive(Debug, Clone)]
pub struct PermissionMatrixState {
    original: Arc<GrantMatrix>,
    current: Arc<GrantMatrix>,
}

impl PermissionMatrixState {
    /// Build a state from the backend grant list
    ///
    /// Codes of an entry without an explicit effect are ALLOW. Entries for the
    /// same resource are merged, later entries winning per code. There is no
    /// default-effect argument: the ALLOW fallback would always override it.
    pub fn create(permissions: &[ResourcePermissionGrant]) -> Self {
        let mut matrix: BTreeMap<String, ResourceGrants> = BTreeMap::new();
        for grant in permissions {
            let effect = grant.effect.unwrap_or(PermissionEffect::Allow);
            let grants = matrix.entry(grant.resource_key.clone()).or_default();
            for code in &grant.permission_codes {
                if effect.is_set() {
                    grants.insert(code.clone(), effect);
                } else {
                    grants.remove(code);
                }
            }
        }
        matrix.retain(|_, grants| !grants.is_empty());

        let original: GrantMatrix = matrix
            .into_iter()
            .map(|(key, grants)| (key, Arc::new(grants)))
            .collect();
        let current = deep_copy(&original);

        debug!(resources = original.len(), "Created permission matrix state");
        Self {
            original: Arc::new(original),
            current: Arc::new(current),
        }
    }

    /// Build a state from a role permission response
    pub fn from_response(response: &RolePermissionResponse) -> Self {
        Self::create(&response.permissions)
    }

    /// Last synced grid
    pub fn original(&self) -> &Arc<GrantMatrix> {
        &self.original
    }

    /// Working grid
    pub fn current(&self) -> &Arc<GrantMatrix> {
        &self.current
    }

    /// Current grants for one resource, `None` when every code is NONE
    pub fn grants(&self, resource_key: &str) -> Option<&ResourceGrants> {
        self.current.get(resource_key).map(|grants| grants.as_ref())
    }

    /// Current effect of one cell
    pub fn effect(&self, resource_key: &str, code: &str) -> PermissionEffect {
        lookup(&self.current, resource_key, code)
    }

    /// Resource keys with at least one current grant
    pub fn resource_keys(&self) -> impl Iterator<Item = &str> {
        self.current.keys().map(String::as_str)
    }

    /// Whether `current` differs from `original` by value
    pub fn is_dirty(&self) -> bool {
        !Arc::ptr_eq(&self.original, &self.current) && *self.original != *self.current
    }

    /// Minimal change set between `original` and `current`
    ///
    /// `all_codes` is the full code universe shown to the user; a code that
    /// was removed from `current` is only detected if it is listed here.
    pub fn generate_diff_payload(&self, all_codes: &[String]) -> RolePermissionPayload {
        let items: Vec<PermissionDiffItem> = self
            .changed_cells(all_codes)
            .map(|(resource_key, code, _, to)| PermissionDiffItem {
                resource_key: resource_key.to_string(),
                permission_code: code.to_string(),
                effect: to.as_grant(),
            })
            .collect();

        debug!(items = items.len(), "Generated permission diff payload");
        RolePermissionPayload { items }
    }

    /// Every changed cell with its before and after effect
    pub fn change_preview(&self, all_codes: &[String]) -> Vec<PermissionChangeItem> {
        self.changed_cells(all_codes)
            .map(|(resource_key, code, from, to)| PermissionChangeItem {
                resource_key: resource_key.to_string(),
                permission_code: code.to_string(),
                from,
                to,
            })
            .collect()
    }

    /// Number of changed cells within the given code universe
    pub fn changed_cell_count(&self, all_codes: &[String]) -> usize {
        self.changed_cells(all_codes).count()
    }

    /// Resource keys whose grants differ between `original` and `current`
    pub fn changed_resources(&self) -> BTreeSet<String> {
        self.all_resource_keys()
            .into_iter()
            .filter(|key| self.original.get(*key) != self.current.get(*key))
            .map(String::from)
            .collect()
    }

    /// Set one cell; NONE removes the grant
    pub fn set_permission_effect(
        &self,
        resource_key: &str,
        code: &str,
        effect: PermissionEffect,
    ) -> Self {
        self.edit(|current| write_cell(current, resource_key, code, effect))
    }

    /// Advance one cell through NONE -> ALLOW -> DENY -> NONE
    pub fn toggle_permission_effect(&self, resource_key: &str, code: &str) -> Self {
        let next = cycle_state(self.effect(resource_key, code));
        self.set_permission_effect(resource_key, code, next)
    }

    /// Replace a resource's grants with `codes` at `effect`
    ///
    /// Codes not listed are dropped. A NONE effect or an empty code list
    /// leaves the resource with no grants.
    pub fn apply_row_permissions(
        &self,
        resource_key: &str,
        codes: &[String],
        effect: PermissionEffect,
    ) -> Self {
        debug!(resource_key, codes = codes.len(), effect = effect.as_str(), "Applying row");
        self.edit(|current| replace_row(current, resource_key, codes, effect))
    }

    /// Set one code on each listed resource, keeping their other codes
    pub fn apply_column_permissions(
        &self,
        code: &str,
        resource_keys: &[String],
        effect: PermissionEffect,
    ) -> Self {
        debug!(code, resources = resource_keys.len(), effect = effect.as_str(), "Applying column");
        self.edit(|current| {
            for resource_key in resource_keys {
                write_cell(current, resource_key, code, effect);
            }
        })
    }

    /// Replace the grants of every listed resource with `codes` at `effect`
    pub fn apply_all_permissions(
        &self,
        resource_keys: &[String],
        codes: &[String],
        effect: PermissionEffect,
    ) -> Self {
        debug!(
            resources = resource_keys.len(),
            codes = codes.len(),
            effect = effect.as_str(),
            "Applying to all"
        );
        self.edit(|current| {
            for resource_key in resource_keys {
                replace_row(current, resource_key, codes, effect);
            }
        })
    }

    /// Set `codes` on a resource and all of its descendants in `tree`
    ///
    /// Merges into each resource's grants. A key absent from the tree is
    /// treated as a leaf.
    pub fn apply_to_resource_and_children(
        &self,
        resource_key: &str,
        codes: &[String],
        effect: PermissionEffect,
        tree: &[ResourceNode],
    ) -> Self {
        let mut targets = vec![resource_key.to_string()];
        targets.extend(descendant_keys(tree, resource_key));

        debug!(
            resource_key,
            resources = targets.len(),
            codes = codes.len(),
            effect = effect.as_str(),
            "Applying to subtree"
        );
        self.edit(|current| {
            for target in &targets {
                for code in codes {
                    write_cell(current, target, code, effect);
                }
            }
        })
    }

    /// Drop every grant of one resource
    pub fn clear_row(&self, resource_key: &str) -> Self {
        self.edit(|current| {
            current.remove(resource_key);
        })
    }

    /// Discard all edits
    pub fn reset(&self) -> Self {
        Self {
            original: Arc::clone(&self.original),
            current: Arc::new(deep_copy(&self.original)),
        }
    }

    fn edit(&self, f: impl FnOnce(&mut GrantMatrix)) -> Self {
        let mut current = GrantMatrix::clone(&self.current);
        f(&mut current);
        Self {
            original: Arc::clone(&self.original),
            current: Arc::new(current),
        }
    }

    fn all_resource_keys(&self) -> BTreeSet<&str> {
        self.original
            .keys()
            .chain(self.current.keys())
            .map(String::as_str)
            .collect()
    }

    fn changed_cells<'a>(
        &'a self,
        all_codes: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a str, PermissionEffect, PermissionEffect)> + 'a {
        self.all_resource_keys().into_iter().flat_map(move |resource_key| {
            all_codes.iter().filter_map(move |code| {
                let from = lookup(&self.original, resource_key, code);
                let to = lookup(&self.current, resource_key, code);
                (from != to).then_some((resource_key, code.as_str(), from, to))
            })
        })
    }
}

fn lookup(matrix: &GrantMatrix, resource_key: &str, code: &str) -> PermissionEffect {
    matrix
        .get(resource_key)
        .and_then(|grants| grants.get(code))
        .copied()
        .unwrap_or_default()
}

fn deep_copy(matrix: &GrantMatrix) -> GrantMatrix {
    matrix
        .iter()
        .map(|(key, grants)| (key.clone(), Arc::new(ResourceGrants::clone(grants))))
        .collect()
}

fn write_cell(current: &mut GrantMatrix, resource_key: &str, code: &str, effect: PermissionEffect) {
    if effect.is_set() {
        let grants = current.entry(resource_key.to_string()).or_default();
        if grants.get(code) != Some(&effect) {
            Arc::make_mut(grants).insert(code.to_string(), effect);
        }
        return;
    }

    let now_empty = match current.get_mut(resource_key) {
        Some(grants) if grants.contains_key(code) => {
            let grants = Arc::make_mut(grants);
            grants.remove(code);
            grants.is_empty()
        }
        _ => false,
    };
    if now_empty {
        current.remove(resource_key);
    }
}

fn replace_row(
    current: &mut GrantMatrix,
    resource_key: &str,
    codes: &[String],
    effect: PermissionEffect,
) {
    if !effect.is_set() || codes.is_empty() {
        current.remove(resource_key);
        return;
    }
    let grants: ResourceGrants = codes.iter().map(|code| (code.clone(), effect)).collect();
    current.insert(resource_key.to_string(), Arc::new(grants));
}
