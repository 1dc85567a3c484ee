//! IDE layer tests
//!
//! Rename support: finding the renamed declaration and verifying indexed
//! symbol locations against current file contents.

pub mod tests_refactor;
