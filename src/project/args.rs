//! Compiler command-line handling.
//!
//! Only the options that change how a file is preprocessed or parsed are
//! interpreted. Everything else is accepted and remembered so a saved unit
//! can report the arguments it was built with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ArgumentError;
use crate::parser::{HeaderSearch, LangOptions, Language, MacroArg};

/// The parts of a compiler invocation the front end cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerArgs {
    /// `-x` value and whether it named a header language.
    pub language: Option<(Language, bool)>,
    /// `-std=` value.
    pub standard: Option<String>,
    pub search: HeaderSearch,
    pub macros: Vec<MacroArg>,
    /// `-include` files, in order.
    pub forced_includes: Vec<PathBuf>,
    pub modules: bool,
    pub target: Option<String>,
    pub stdlib: Option<String>,
    /// `--gcc-toolchain=`; an empty value means "not given".
    pub gcc_toolchain: Option<PathBuf>,
    pub sysroot: Option<PathBuf>,
    /// Non-option arguments (source files named on the command line).
    pub inputs: Vec<PathBuf>,
    /// Options accepted without effect.
    pub ignored: Vec<String>,
}

/// Options that consume the following argument when written separately.
const SEPARATE_VALUE: &[&str] = &[
    "-x",
    "-I",
    "-iquote",
    "-isystem",
    "-idirafter",
    "-D",
    "-U",
    "-include",
    "-target",
    "-gcc-toolchain",
    "-isysroot",
    "-o",
    "-MF",
    "-MT",
    "-Xclang",
];

impl CompilerArgs {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, ArgumentError> {
        let mut out = CompilerArgs::default();
        let mut iter = args.iter().map(AsRef::as_ref);

        while let Some(arg) = iter.next() {
            if SEPARATE_VALUE.contains(&arg) {
                let value = iter
                    .next()
                    .ok_or_else(|| ArgumentError::MissingValue(arg.to_string()))?;
                out.apply(arg, value)?;
                continue;
            }
            if let Some(value) = arg.strip_prefix("-std=") {
                out.standard = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("-stdlib=") {
                out.stdlib = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--target=") {
                out.target = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("--gcc-toolchain=") {
                out.gcc_toolchain = non_empty(value);
            } else if let Some(value) = arg.strip_prefix("--sysroot=") {
                out.sysroot = non_empty(value);
            } else if arg == "-fmodules" {
                out.modules = true;
            } else if arg == "-fno-modules" {
                out.modules = false;
            } else if let Some(value) = arg.strip_prefix("-x") {
                out.apply("-x", value)?;
            } else if let Some(value) = arg.strip_prefix("-I") {
                out.apply("-I", value)?;
            } else if let Some(value) = arg.strip_prefix("-D") {
                out.apply("-D", value)?;
            } else if let Some(value) = arg.strip_prefix("-U") {
                out.apply("-U", value)?;
            } else if arg.starts_with('-') {
                tracing::trace!(arg, "ignoring compiler argument");
                out.ignored.push(arg.to_string());
            } else {
                out.inputs.push(PathBuf::from(arg));
            }
        }
        Ok(out)
    }

    fn apply(&mut self, option: &str, value: &str) -> Result<(), ArgumentError> {
        match option {
            "-x" => {
                let language = Language::from_x_arg(value)
                    .ok_or_else(|| ArgumentError::UnknownLanguage(value.to_string()))?;
                self.language = Some(language);
            }
            "-I" => self.search.angled_dirs.push(PathBuf::from(value)),
            "-iquote" => self.search.quote_dirs.push(PathBuf::from(value)),
            "-isystem" | "-idirafter" => self.search.system_dirs.push(PathBuf::from(value)),
            "-D" => self.macros.push(MacroArg::Define(value.to_string())),
            "-U" => self.macros.push(MacroArg::Undef(value.to_string())),
            "-include" => self.forced_includes.push(PathBuf::from(value)),
            "-target" => self.target = Some(value.to_string()),
            "-gcc-toolchain" => self.gcc_toolchain = non_empty(value),
            "-isysroot" => self.sysroot = non_empty(value),
            _ => self.ignored.extend([option.to_string(), value.to_string()]),
        }
        Ok(())
    }

    /// Language options for `path` under these arguments: the extension
    /// picks the language unless `-x` overrides it, then `-std=` and
    /// `-fmodules` are applied.
    pub fn lang_options(&self, path: &Path) -> Result<LangOptions, ArgumentError> {
        let mut lang = LangOptions::for_path(path);
        if let Some((language, is_header)) = self.language {
            lang.set_language(language, is_header);
        }
        if let Some(standard) = &self.standard {
            if !lang.set_standard(standard) {
                return Err(ArgumentError::InvalidStandard(standard.clone()));
            }
        }
        lang.modules = self.modules;
        Ok(lang)
    }
}

fn non_empty(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::LangStandard;

    #[test]
    fn search_paths_and_macros_keep_order() {
        let args =
            CompilerArgs::parse(&["-I", "/a", "-I/b", "-iquote", "/q", "-DX=1", "-U", "Y"]).unwrap();
        assert_eq!(
            args.search.angled_dirs,
            [PathBuf::from("/a"), PathBuf::from("/b")]
        );
        assert_eq!(args.search.quote_dirs, [PathBuf::from("/q")]);
        assert_eq!(
            args.macros,
            [
                MacroArg::Define("X=1".into()),
                MacroArg::Undef("Y".into())
            ]
        );
    }

    #[test]
    fn language_overrides_extension() {
        let args = CompilerArgs::parse(&["-xc++-header", "-std=c++11"]).unwrap();
        let lang = args.lang_options(Path::new("test.h")).unwrap();
        assert_eq!(lang.language, Language::Cxx);
        assert!(lang.is_header);
        assert_eq!(lang.standard, LangStandard::Cxx11);
    }

    #[test]
    fn toolchain_options() {
        let args = CompilerArgs::parse(&[
            "-target",
            "arm-linux-gnueabi",
            "-stdlib=libstdc++",
            "--gcc-toolchain=",
            "-fmodules",
            "-fmodules-cache-path=/tmp/x",
        ])
        .unwrap();
        assert_eq!(args.target.as_deref(), Some("arm-linux-gnueabi"));
        assert_eq!(args.stdlib.as_deref(), Some("libstdc++"));
        assert_eq!(args.gcc_toolchain, None);
        assert!(args.modules);
        assert_eq!(args.ignored, ["-fmodules-cache-path=/tmp/x"]);
    }

    #[test]
    fn malformed_arguments() {
        assert_eq!(
            CompilerArgs::parse(&["-I"]),
            Err(ArgumentError::MissingValue("-I".into()))
        );
        assert_eq!(
            CompilerArgs::parse(&["-x", "cobol"]),
            Err(ArgumentError::UnknownLanguage("cobol".into()))
        );
        let args = CompilerArgs::parse(&["-std=c++11"]).unwrap();
        assert!(args.lang_options(Path::new("a.c")).is_err());
    }
}
