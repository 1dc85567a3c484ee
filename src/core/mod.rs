pub mod text_utils;

pub use text_utils::{identifier_at, is_identifier, name_pieces};
