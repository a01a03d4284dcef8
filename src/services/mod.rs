//! Permission matrix services

pub mod matrix_edit;
pub mod permission_matrix;
pub mod permission_merge;
pub mod resource_tree;

pub use matrix_edit::{apply_edits, validate_edits, MatrixEdit};
pub use permission_matrix::{cycle_state, GrantMatrix, PermissionMatrixState, ResourceGrants};
pub use permission_merge::merge_role_permissions;
pub use resource_tree::{
    build_resource_tree, descendant_keys, find_resource, flatten_resource_tree,
    group_by_resource_type, walk_preorder,
};
