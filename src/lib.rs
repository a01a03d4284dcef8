//! Permission Matrix Library
//!
//! Editing engine for role permission matrices: build the resource tree,
//! load a role's grants, apply cell/row/column/subtree edits, and produce the
//! minimal change payload to send back to the backend.

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{AppConfig, SessionFile};
pub use services::{MatrixEdit, PermissionMatrixState};
pub use utils::error::{MatrixError, MatrixResult};
