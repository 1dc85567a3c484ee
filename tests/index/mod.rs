//! Index layer tests
//!
//! Tests for translation units as clients see them:
//! - Creating units and argument validation
//! - Cursor traversal and cursor queries
//! - Types and qualifiers
//! - Location resolution and skipped ranges
//! - Reparse
//! - Save and load

pub mod tests_cursor;
pub mod tests_locations;
pub mod tests_parse;
pub mod tests_reparse;
pub mod tests_serialization;
pub mod tests_types;
