//! Searching content supplied in memory.

use std::path::PathBuf;

use sift_core::{Mode, SearchResults};
use sift_syntax::SupportedLanguage;

use super::{FileSystemSearchArgs, MemoryLoader, QueryInput, search_with_loader};
use crate::error::SearchFailure;

/// A file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInMemory {
    /// Path reported in matches.
    pub path: PathBuf,
    /// File content.
    pub content: String,
}

impl FileInMemory {
    /// Creates an in-memory file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Arguments of [`search_in_strings`].
#[derive(Debug, Clone)]
pub struct StringsSearchArgs {
    /// Files to search, in reporting order.
    pub files: Vec<FileInMemory>,
    /// Queries to run.
    pub queries: QueryInput,
    /// Matching mode.
    pub mode: Mode,
    /// Whether names, strings and text compare case-insensitively.
    pub case_insensitive: bool,
    /// Parser name.
    pub parser: String,
    /// Emits step-by-step debug events.
    pub debug: bool,
}

impl StringsSearchArgs {
    /// Creates arguments searching `files` for `query_codes` in include mode
    /// with the TypeScript parser.
    #[must_use]
    pub fn new<Q: Into<String>>(files: Vec<FileInMemory>, query_codes: impl IntoIterator<Item = Q>) -> Self {
        Self {
            files,
            queries: QueryInput::Codes(query_codes.into_iter().map(Into::into).collect()),
            mode: Mode::default(),
            case_insensitive: false,
            parser: SupportedLanguage::default().as_str().to_owned(),
            debug: false,
        }
    }

    /// Sets the matching mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets case-insensitive matching.
    #[must_use]
    pub const fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Selects the parser by name.
    #[must_use]
    pub fn with_parser(mut self, parser: impl Into<String>) -> Self {
        self.parser = parser.into();
        self
    }

    /// Selects the parser by language.
    #[must_use]
    pub fn with_language(self, language: SupportedLanguage) -> Self {
        self.with_parser(language.as_str())
    }

    /// Enables debug events.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Searches in-memory files without touching the file system.
///
/// # Errors
///
/// Returns a [`SearchFailure`] for an unknown parser, a grammar that cannot
/// be loaded or a broken adapter contract.
pub fn search_in_strings(args: &StringsSearchArgs) -> Result<SearchResults, SearchFailure> {
    let loader = MemoryLoader::new(
        args.files
            .iter()
            .map(|file| (file.path.clone(), file.content.clone())),
    );
    let mut run = FileSystemSearchArgs::new(
        args.files.iter().map(|file| file.path.clone()),
        Vec::<String>::new(),
    )
    .with_mode(args.mode)
    .with_case_insensitive(args.case_insensitive)
    .with_parser(args.parser.clone())
    .with_debug(args.debug);
    run.queries = args.queries.clone();
    search_with_loader(&run, &loader)
}
