//! Typed options for creating, reparsing and saving units.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Options shared by every unit an [`Index`](super::Index) creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexOptions {
    /// Drop diagnostics whose location lies outside the main file.
    pub exclude_declarations_from_pch: bool,
    /// Log diagnostics as they are produced.
    pub display_diagnostics: bool,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TranslationUnitFlags: u32 {
        const DETAILED_PREPROCESSING_RECORD = 1 << 0;
        /// The unit is incomplete (a header parsed on its own).
        const INCOMPLETE = 1 << 1;
        const PRECOMPILED_PREAMBLE = 1 << 2;
        const CACHE_COMPLETION_RESULTS = 1 << 3;
        const FOR_SERIALIZATION = 1 << 4;
        const SKIP_FUNCTION_BODIES = 1 << 6;
        const INCLUDE_BRIEF_COMMENTS_IN_CODE_COMPLETION = 1 << 7;
        const CREATE_PREAMBLE_ON_FIRST_PARSE = 1 << 8;
        /// Keep parsing after a fatal error.
        const KEEP_GOING = 1 << 9;
        /// Do not follow `#include`.
        const SINGLE_FILE_PARSE = 1 << 10;
        const LIMIT_SKIP_FUNCTION_BODIES_TO_PREAMBLE = 1 << 11;
        const INCLUDE_ATTRIBUTED_TYPES = 1 << 12;
        const VISIT_IMPLICIT_ATTRIBUTES = 1 << 13;
        const IGNORE_NON_ERRORS_FROM_INCLUDED_FILES = 1 << 14;
        const RETAIN_EXCLUDED_CONDITIONAL_BLOCKS = 1 << 15;
    }
}

impl TranslationUnitFlags {
    /// Flags an editor would pass for a unit it keeps reparsing.
    pub fn editing() -> Self {
        TranslationUnitFlags::PRECOMPILED_PREAMBLE
            | TranslationUnitFlags::CACHE_COMPLETION_RESULTS
            | TranslationUnitFlags::CREATE_PREAMBLE_ON_FIRST_PARSE
    }
}

bitflags! {
    /// No reparse option is defined yet; the type keeps the signature stable.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ReparseFlags: u32 {}
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SaveFlags: u32 {
        /// Pretty-print the saved document.
        const PRETTY = 1 << 0;
    }
}

/// Reparse options matching the flags a unit was created with.
pub fn default_reparse_options(_flags: TranslationUnitFlags) -> ReparseFlags {
    ReparseFlags::empty()
}

pub fn default_save_options(_flags: TranslationUnitFlags) -> SaveFlags {
    SaveFlags::empty()
}
