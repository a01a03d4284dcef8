//! Common test utilities and helpers
//!
//! This module provides shared test infrastructure including:
//! - Resource catalog and grant fixtures
//! - Factories for generated resource trees

pub mod fixtures;

pub use factories::*;
pub use fixtures::*;
