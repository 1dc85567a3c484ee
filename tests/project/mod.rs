//! Project layer tests
//!
//! Overlay and module map documents handed to other tools.

pub mod tests_overlay;
