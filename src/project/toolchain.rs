//! Toolchain discovery from the compiler driver path.
//!
//! A driver at `<prefix>/bin/clang` implies an installation rooted at
//! `<prefix>`. The GCC installation (for libstdc++ headers) is looked up
//! under `--gcc-toolchain` when given, otherwise under that prefix, as
//! `lib/gcc/<triple>/<version>/crtbegin.o`. Only directories that exist are
//! added to the include search.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use super::CompilerArgs;
use crate::parser::LangOptions;

/// A GCC version directory name such as `9.4.0` or `99.9.9`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GccVersion {
    pub text: String,
    parts: Vec<u32>,
}

impl GccVersion {
    /// `None` when the name does not start with a number.
    pub fn parse(text: &str) -> Option<Self> {
        let parts: Vec<u32> = text
            .split('.')
            .map_while(|piece| piece.parse().ok())
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            parts,
        })
    }
}

impl Ord for GccVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts
            .cmp(&other.parts)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for GccVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GccVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GccInstallation {
    /// Directory containing `lib/gcc` and `include`.
    pub prefix: PathBuf,
    pub triple: String,
    pub version: GccVersion,
}

impl GccInstallation {
    /// Directory holding `crtbegin.o`.
    pub fn lib_dir(&self) -> PathBuf {
        self.prefix
            .join("lib/gcc")
            .join(&self.triple)
            .join(&self.version.text)
    }

    /// libstdc++ header directories, most specific first.
    pub fn libstdcxx_dirs(&self) -> Vec<PathBuf> {
        let version = &self.version.text;
        let base = self.prefix.join("include/c++").join(version);
        vec![
            base.clone(),
            base.join(&self.triple),
            self.prefix
                .join("include")
                .join(&self.triple)
                .join("c++")
                .join(version),
            base.join("backward"),
        ]
    }
}

/// The installation a full command line refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub driver: PathBuf,
    pub prefix: Option<PathBuf>,
    pub triple: String,
    pub gcc: Option<GccInstallation>,
    pub stdlib: StdLib,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdLib {
    LibStdCxx,
    LibCxx,
}

/// Triple used when the command line names none.
pub fn host_triple() -> String {
    format!("{}-{}-gnu", std::env::consts::ARCH, std::env::consts::OS)
}

impl Toolchain {
    pub fn detect(driver: &Path, args: &CompilerArgs) -> Self {
        let prefix = driver
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf);
        let triple = args.target.clone().unwrap_or_else(host_triple);
        let stdlib = match args.stdlib.as_deref() {
            Some("libc++") => StdLib::LibCxx,
            _ => StdLib::LibStdCxx,
        };

        let search_root = args.gcc_toolchain.clone().or_else(|| prefix.clone());
        let gcc = search_root.and_then(|root| find_gcc(&root, &triple));
        match &gcc {
            Some(gcc) => tracing::debug!(
                triple = %gcc.triple,
                version = %gcc.version,
                prefix = %gcc.prefix.display(),
                "found GCC installation"
            ),
            None => tracing::debug!(%triple, "no GCC installation"),
        }

        Self {
            driver: driver.to_path_buf(),
            prefix,
            triple,
            gcc,
            stdlib,
        }
    }

    /// System include directories for a unit in `lang`.
    pub fn include_dirs(&self, lang: &LangOptions) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if lang.cplusplus() {
            match self.stdlib {
                StdLib::LibStdCxx => {
                    if let Some(gcc) = &self.gcc {
                        candidates.extend(gcc.libstdcxx_dirs());
                    }
                }
                StdLib::LibCxx => {
                    if let Some(prefix) = &self.prefix {
                        candidates.push(prefix.join("include/c++/v1"));
                    }
                }
            }
        }
        if let Some(prefix) = &self.prefix {
            candidates.push(prefix.join("include").join(&self.triple));
            candidates.push(prefix.join("include"));
        }
        candidates.retain(|dir| dir.is_dir());
        candidates.dedup();
        candidates
    }
}

/// Highest GCC version under `root/lib/gcc/<triple>` that ships `crtbegin.o`.
fn find_gcc(root: &Path, triple: &str) -> Option<GccInstallation> {
    let dir = root.join("lib/gcc").join(triple);
    let entries = std::fs::read_dir(&dir).ok()?;
    entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().join("crtbegin.o").is_file())
        .filter_map(|entry| GccVersion::parse(entry.file_name().to_str()?))
        .max()
        .map(|version| GccInstallation {
            prefix: root.to_path_buf(),
            triple: triple.to_string(),
            version,
        })
}
