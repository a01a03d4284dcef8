//! Integration tests for the permission matrix engine
//!
//! These tests drive the public API end to end: flat catalog in, tree built,
//! grants loaded, edits applied, payload out. The binary is exercised through
//! its command line.

mod matrix_tests;
