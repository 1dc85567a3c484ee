//! Language options: which C-family dialect a unit is parsed as.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    C,
    Cxx,
    ObjC,
    ObjCxx,
}

impl Language {
    /// Language and header-ness implied by a file extension.
    pub fn from_extension(ext: &str) -> Option<(Language, bool)> {
        match ext {
            "c" => Some((Language::C, false)),
            "h" => Some((Language::C, true)),
            "cc" | "cp" | "cpp" | "cxx" | "c++" | "C" => Some((Language::Cxx, false)),
            "hh" | "hpp" | "hxx" | "h++" | "H" => Some((Language::Cxx, true)),
            "m" => Some((Language::ObjC, false)),
            "mm" | "M" => Some((Language::ObjCxx, false)),
            _ => None,
        }
    }

    /// Language named by a `-x` argument value.
    pub fn from_x_arg(value: &str) -> Option<(Language, bool)> {
        match value {
            "c" => Some((Language::C, false)),
            "c-header" => Some((Language::C, true)),
            "c++" => Some((Language::Cxx, false)),
            "c++-header" => Some((Language::Cxx, true)),
            "objective-c" => Some((Language::ObjC, false)),
            "objective-c-header" => Some((Language::ObjC, true)),
            "objective-c++" => Some((Language::ObjCxx, false)),
            "objective-c++-header" => Some((Language::ObjCxx, true)),
            _ => None,
        }
    }

    pub fn is_cplusplus(self) -> bool {
        matches!(self, Language::Cxx | Language::ObjCxx)
    }

    pub fn is_objc(self) -> bool {
        matches!(self, Language::ObjC | Language::ObjCxx)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LangStandard {
    C89,
    C99,
    C11,
    C17,
    C23,
    Cxx98,
    Cxx11,
    Cxx14,
    Cxx17,
    Cxx20,
    Cxx23,
}

impl LangStandard {
    /// Parse a `-std=` value. Returns the standard and whether GNU extensions
    /// are enabled.
    pub fn parse(name: &str) -> Option<(LangStandard, bool)> {
        let (gnu, base) = match name.strip_prefix("gnu") {
            Some(rest) => (true, rest),
            None => (false, name.strip_prefix('c').unwrap_or(name)),
        };
        let base = base.strip_prefix('c').unwrap_or(base);
        let standard = match base {
            "89" | "90" => LangStandard::C89,
            "99" | "9x" => LangStandard::C99,
            "11" | "1x" => LangStandard::C11,
            "17" | "18" => LangStandard::C17,
            "23" | "2x" => LangStandard::C23,
            "++98" | "++03" => LangStandard::Cxx98,
            "++11" | "++0x" => LangStandard::Cxx11,
            "++14" | "++1y" => LangStandard::Cxx14,
            "++17" | "++1z" => LangStandard::Cxx17,
            "++20" | "++2a" => LangStandard::Cxx20,
            "++23" | "++2b" => LangStandard::Cxx23,
            _ => return None,
        };
        Some((standard, gnu))
    }

    pub fn is_cplusplus(self) -> bool {
        self >= LangStandard::Cxx98
    }

    fn default_for(language: Language) -> LangStandard {
        if language.is_cplusplus() {
            LangStandard::Cxx17
        } else {
            LangStandard::C17
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LangOptions {
    pub language: Language,
    pub standard: LangStandard,
    pub gnu_extensions: bool,
    pub is_header: bool,
    pub modules: bool,
}

impl Default for LangOptions {
    fn default() -> Self {
        Self::new(Language::C)
    }
}

impl LangOptions {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            standard: LangStandard::default_for(language),
            gnu_extensions: true,
            is_header: false,
            modules: false,
        }
    }

    /// Options implied by the file name alone. Unknown extensions parse as C.
    pub fn for_path(path: &Path) -> Self {
        let (language, is_header) = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Language::from_extension)
            .unwrap_or((Language::C, false));
        Self {
            is_header,
            ..Self::new(language)
        }
    }

    /// Switch language, resetting the standard when it no longer applies.
    pub fn set_language(&mut self, language: Language, is_header: bool) {
        self.language = language;
        self.is_header = is_header;
        if self.standard.is_cplusplus() != language.is_cplusplus() {
            self.standard = LangStandard::default_for(language);
        }
    }

    /// Apply a `-std=` value. Returns `false` when it does not fit the language.
    pub fn set_standard(&mut self, name: &str) -> bool {
        match LangStandard::parse(name) {
            Some((standard, gnu)) if standard.is_cplusplus() == self.cplusplus() => {
                self.standard = standard;
                self.gnu_extensions = gnu;
                true
            }
            _ => false,
        }
    }

    pub fn cplusplus(&self) -> bool {
        self.language.is_cplusplus()
    }

    pub fn cplusplus11(&self) -> bool {
        self.cplusplus() && self.standard >= LangStandard::Cxx11
    }

    pub fn objc(&self) -> bool {
        self.language.is_objc()
    }

    pub fn c99(&self) -> bool {
        !self.cplusplus() && self.standard >= LangStandard::C99
    }

    pub fn c23(&self) -> bool {
        !self.cplusplus() && self.standard >= LangStandard::C23
    }

    /// `bool`, `true` and `false` are keywords.
    pub fn bool_keywords(&self) -> bool {
        self.cplusplus() || self.c23()
    }

    /// Macros every unit starts with, in definition order.
    pub fn predefined_macros(&self) -> Vec<(&'static str, &'static str)> {
        let mut macros = vec![
            ("__STDC__", "1"),
            ("__STDC_HOSTED__", "1"),
            ("__clang__", "1"),
            ("__CXINDEX__", "1"),
        ];
        if self.gnu_extensions {
            macros.push(("__GNUC__", "4"));
        }
        if self.cplusplus() {
            let version = match self.standard {
                LangStandard::Cxx11 => "201103L",
                LangStandard::Cxx14 => "201402L",
                LangStandard::Cxx17 => "201703L",
                LangStandard::Cxx20 => "202002L",
                LangStandard::Cxx23 => "202302L",
                _ => "199711L",
            };
            macros.push(("__cplusplus", version));
        } else {
            let version = match self.standard {
                LangStandard::C99 => Some("199901L"),
                LangStandard::C11 => Some("201112L"),
                LangStandard::C17 => Some("201710L"),
                LangStandard::C23 => Some("202311L"),
                _ => None,
            };
            if let Some(version) = version {
                macros.push(("__STDC_VERSION__", version));
            }
        }
        if self.objc() {
            macros.push(("__OBJC__", "1"));
        }
        if self.modules {
            macros.push(("__clang_modules__", "1"));
        }
        macros
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_defaults() {
        assert_eq!(LangOptions::for_path(Path::new("a.h")).language, Language::C);
        assert!(LangOptions::for_path(Path::new("a.h")).is_header);
        assert_eq!(LangOptions::for_path(Path::new("a.cpp")).language, Language::Cxx);
        assert_eq!(LangOptions::for_path(Path::new("a.m")).language, Language::ObjC);
        assert_eq!(LangOptions::for_path(Path::new("a.cpp")).standard, LangStandard::Cxx17);
    }

    #[test]
    fn standards() {
        assert_eq!(LangStandard::parse("c++11"), Some((LangStandard::Cxx11, false)));
        assert_eq!(LangStandard::parse("gnu++17"), Some((LangStandard::Cxx17, true)));
        assert_eq!(LangStandard::parse("c99"), Some((LangStandard::C99, false)));
        assert_eq!(LangStandard::parse("gnu11"), Some((LangStandard::C11, true)));
        assert_eq!(LangStandard::parse("pascal"), None);
    }

    #[test]
    fn standard_must_match_language() {
        let mut opts = LangOptions::new(Language::C);
        assert!(!opts.set_standard("c++11"));
        opts.set_language(Language::Cxx, true);
        assert!(opts.set_standard("c++11"));
        assert!(opts.cplusplus11());
    }
}
