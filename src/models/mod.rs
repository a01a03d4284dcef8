//! Data models

mod permission;
mod resource;

pub use permission::*;
pub use resource::*;
