//! Shared world for Cucumber scenarios


pub use world::*;
