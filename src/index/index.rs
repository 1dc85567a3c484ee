//! The entry point: an [`Index`] creates translation units.

use std::path::{Path, PathBuf};

use super::frontend::{self, UnitConfig};
use super::options::{IndexOptions, TranslationUnitFlags};
use super::unit::TranslationUnit;
use crate::base::FileSet;
use crate::error::{LoadError, ParseError};
use crate::hir::SourceCache;
use crate::project::{CompilerArgs, FileOverlay, Toolchain, UnsavedFile};

#[derive(Debug, Clone, Default)]
pub struct Index {
    options: IndexOptions,
}

impl Index {
    pub fn new(options: IndexOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> IndexOptions {
        self.options
    }

    pub fn set_options(&mut self, options: IndexOptions) {
        self.options = options;
    }

    /// Parse `path` with the compiler arguments `args` (no driver). When
    /// `path` is empty the first source file named in `args` is used.
    pub fn parse<S: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        args: &[S],
        unsaved: &[UnsavedFile],
        flags: TranslationUnitFlags,
    ) -> Result<TranslationUnit, ParseError> {
        self.create(path.as_ref(), None, args, unsaved, flags)
    }

    /// Like [`Index::parse`], but `argv[0]` is the compiler driver. Its
    /// location decides which toolchain headers are searched.
    pub fn parse_full_argv<S: AsRef<str>>(
        &self,
        path: impl AsRef<Path>,
        argv: &[S],
        unsaved: &[UnsavedFile],
        flags: TranslationUnitFlags,
    ) -> Result<TranslationUnit, ParseError> {
        let Some((driver, args)) = argv.split_first() else {
            return Err(ParseError::InvalidArguments(
                "argv must name the compiler driver".to_string(),
            ));
        };
        let driver = Path::new(driver.as_ref());
        self.create(path.as_ref(), Some(driver), args, unsaved, flags)
    }

    /// Restore a unit written by [`TranslationUnit::save`].
    pub fn load(&self, path: impl AsRef<Path>) -> Result<TranslationUnit, LoadError> {
        TranslationUnit::load(path.as_ref(), self.options)
    }

    fn create<S: AsRef<str>>(
        &self,
        path: &Path,
        driver: Option<&Path>,
        args: &[S],
        unsaved: &[UnsavedFile],
        flags: TranslationUnitFlags,
    ) -> Result<TranslationUnit, ParseError> {
        let compiler = CompilerArgs::parse(args)?;
        let main: PathBuf = if path.as_os_str().is_empty() {
            compiler
                .inputs
                .first()
                .cloned()
                .ok_or_else(|| ParseError::InvalidArguments("no source file given".to_string()))?
        } else {
            path.to_path_buf()
        };
        let lang = compiler.lang_options(&main)?;
        let overlay = FileOverlay::from_unsaved(unsaved).map_err(ParseError::InvalidArguments)?;

        let system_dirs = match driver {
            Some(driver) => Toolchain::detect(driver, &compiler).include_dirs(&lang),
            None => Vec::new(),
        };
        let args: Vec<String> = args.iter().map(|arg| arg.as_ref().to_string()).collect();
        let config = UnitConfig::new(main, args, &compiler, lang, system_dirs, flags);
        tracing::debug!(
            main = %config.main.display(),
            language = ?config.lang.language,
            args = config.args.len(),
            "parsing translation unit"
        );

        let mut files = FileSet::new();
        let mut cache = SourceCache::new();
        let output = frontend::run(&config, &self.options, &mut files, &mut cache, &overlay)
            .map_err(|source| ParseError::Failure {
                path: config.main.clone(),
                source,
            })?;
        Ok(TranslationUnit::from_frontend(
            config,
            self.options,
            files,
            cache,
            output,
        ))
    }
}
