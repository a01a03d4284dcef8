//! Cucumber feature support and step definitions

pub mod support;

pub use support::TestWorld;
