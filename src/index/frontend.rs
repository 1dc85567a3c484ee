//! One front-end run: preprocess, parse and analyze the main file.
//!
//! Files are read through the unsaved overlay and registered in the unit's
//! [`FileSet`]; their raw tokens come from the unit's [`SourceCache`], so a
//! file whose text did not change since the previous run is not re-lexed.

use std::io;
use std::path::{Path, PathBuf};

use text_size::TextSize;

use super::options::{IndexOptions, TranslationUnitFlags};
use crate::base::{FileId, FileSet, SourceBuffer, SourceRange};
use crate::hir::{self, Diagnostic, DiagnosticDisplayOptions, DiagnosticSink, SourceCache};
use crate::parser::{
    self, HeaderSearch, Inclusion, LangOptions, MacroArg, MainFile, ParseOptions, PreprocessConfig,
    SourceProvider, TokenList,
};
use crate::project::{CompilerArgs, FileOverlay, normalize_path};

/// Everything that decides how a unit is built, fixed at creation time.
#[derive(Debug, Clone)]
pub(crate) struct UnitConfig {
    /// Main file path as the client spelled it.
    pub main: PathBuf,
    /// Command line without the driver.
    pub args: Vec<String>,
    pub lang: LangOptions,
    /// Search path including toolchain directories.
    pub search: HeaderSearch,
    pub macros: Vec<MacroArg>,
    pub forced_includes: Vec<PathBuf>,
    pub flags: TranslationUnitFlags,
}

impl UnitConfig {
    pub fn new(
        main: PathBuf,
        args: Vec<String>,
        compiler: &CompilerArgs,
        lang: LangOptions,
        system_dirs: Vec<PathBuf>,
        flags: TranslationUnitFlags,
    ) -> Self {
        let mut search = compiler.search.clone();
        search.system_dirs.extend(system_dirs);
        Self {
            main,
            args,
            lang,
            search,
            macros: compiler.macros.clone(),
            forced_includes: compiler.forced_includes.clone(),
            flags,
        }
    }
}

pub(crate) struct FrontendOutput {
    pub main: FileId,
    pub ast: crate::syntax::Ast,
    pub diagnostics: Vec<Diagnostic>,
    pub skipped: Vec<SourceRange>,
    pub inclusions: Vec<Inclusion>,
}

/// Source provider over a unit's buffers.
struct Sources<'a> {
    files: &'a mut FileSet,
    cache: &'a mut SourceCache,
    overlay: &'a FileOverlay,
}

impl Sources<'_> {
    fn register(&mut self, name: &Path, text: &str) -> FileId {
        let path = normalize_path(name);
        let (id, changed) = self.files.upsert(name, &path, text);
        if changed {
            tracing::trace!(path = %path.display(), "buffer contents changed");
        }
        id
    }
}

impl SourceProvider for Sources<'_> {
    fn load(&mut self, path: &Path) -> Option<FileId> {
        let text = self.overlay.read(path).ok()?;
        Some(self.register(path, &text))
    }

    fn exists(&self, path: &Path) -> bool {
        self.overlay.exists(path)
    }

    fn add_virtual(&mut self, name: &str, text: &str) -> FileId {
        self.files.upsert(Path::new(name), Path::new(name), text).0
    }

    fn buffer(&self, file: FileId) -> Option<&SourceBuffer> {
        self.files.get(file)
    }

    fn tokens(&mut self, file: FileId) -> TokenList {
        match self.files.get(file) {
            Some(buffer) => {
                let text = buffer.shared_text();
                self.cache.tokens(file, &text)
            }
            None => TokenList::default(),
        }
    }
}

/// Run the whole front end. Fails only when the main file cannot be read;
/// every other problem is a diagnostic.
pub(crate) fn run(
    config: &UnitConfig,
    options: &IndexOptions,
    files: &mut FileSet,
    cache: &mut SourceCache,
    overlay: &FileOverlay,
) -> io::Result<FrontendOutput> {
    let text = overlay.read(&config.main)?.into_owned();
    let mut sources = Sources {
        files,
        cache,
        overlay,
    };
    let main = sources.register(&config.main, &text);

    let pp_config = PreprocessConfig {
        lang: &config.lang,
        search: &config.search,
        macros: &config.macros,
        forced_includes: &config.forced_includes,
        single_file: config.flags.contains(TranslationUnitFlags::SINGLE_FILE_PARSE),
    };
    let pp = parser::preprocess(main, &pp_config, &mut sources);

    let name = config.main.to_string_lossy();
    let main_file = MainFile {
        id: main,
        name: &name,
        len: TextSize::of(text.as_str()),
    };
    let parse_options = ParseOptions {
        skip_function_bodies: config
            .flags
            .contains(TranslationUnitFlags::SKIP_FUNCTION_BODIES),
    };
    let mut parse = parser::parse(&pp.tokens, &config.lang, main_file, parse_options);
    let semantic = hir::analyze(&mut parse.ast, &config.lang);

    let mut sink = DiagnosticSink::new(config.flags.contains(TranslationUnitFlags::KEEP_GOING));
    sink.extend(pp.diagnostics);
    sink.extend(parse.diagnostics);
    sink.extend(semantic);
    let mut diagnostics = sink.into_vec();

    if config
        .flags
        .contains(TranslationUnitFlags::IGNORE_NON_ERRORS_FROM_INCLUDED_FILES)
    {
        diagnostics.retain(|d| d.is_error() || d.location.is_none_or(|loc| loc.file() == main));
    }
    if options.exclude_declarations_from_pch {
        diagnostics.retain(|d| d.location.is_none_or(|loc| loc.file() == main));
    }
    if options.display_diagnostics {
        for diagnostic in &diagnostics {
            tracing::info!(
                "{}",
                diagnostic.format(sources.files, DiagnosticDisplayOptions::default())
            );
        }
    }

    tracing::debug!(
        main = %config.main.display(),
        nodes = parse.ast.len(),
        diagnostics = diagnostics.len(),
        "front end finished"
    );
    Ok(FrontendOutput {
        main,
        ast: parse.ast,
        diagnostics,
        skipped: pp.skipped,
        inclusions: pp.inclusions,
    })
}
