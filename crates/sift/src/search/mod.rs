//! Search orchestration.
//!
//! Every entry point follows the same per-file pipeline: load the content,
//! apply the token pre-filter, parse, match every compiled query, render the
//! matches and deduplicate them by range. Bad queries and unreadable or
//! unparsable files are recorded in [`SearchResults::errors`]; only a
//! [`SearchFailure`] aborts a run.

mod code_frame;
mod file;
mod fs;
mod multi_thread;
mod strings;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sift_core::{Mode, MatchWithFileInfo, SearchConfig, SearchError, SearchResults};
use sift_syntax::SupportedLanguage;

use crate::adapter::{ParserAdapter, adapter_by_name};
use crate::error::SearchFailure;
use crate::hard_stop::HardStopFlag;
use crate::logger::SearchLogger;
use crate::matcher::SearchSettings;
use crate::query::{ParsedQuery, QueryCache, parse_queries};
use crate::text_search::TextQuery;
use crate::wildcard::{DEFAULT_PATTERN_CACHE_CAPACITY, PatternCache};

use file::{FileError, dedup_matches, search_file_content, search_text_content};

pub use fs::{FsLoader, MemoryLoader, SourceLoader};
pub use multi_thread::{plan_chunks, search_multi_thread};
pub use strings::{FileInMemory, StringsSearchArgs, search_in_strings};

/// Receives each non-empty batch of per-file matches as soon as it is found.
///
/// Multi-threaded searches call it from worker threads.
pub type PartialResultCallback = Arc<dyn Fn(&[MatchWithFileInfo]) + Send + Sync>;

/// Queries of a search, as text or already compiled.
#[derive(Debug, Clone)]
pub enum QueryInput {
    /// Raw query texts.
    Codes(Vec<String>),
    /// Queries compiled with [`parse_queries`].
    Parsed(Vec<ParsedQuery>),
}

impl QueryInput {
    /// Returns the query texts.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        match self {
            Self::Codes(codes) => codes.iter().map(String::as_str).collect(),
            Self::Parsed(parsed) => parsed.iter().map(|query| query.query_code.as_str()).collect(),
        }
    }
}

/// Arguments of [`search_in_file_system`] and [`search_multi_thread`].
#[derive(Clone)]
pub struct FileSystemSearchArgs {
    /// Files to search, in reporting order.
    pub file_paths: Vec<PathBuf>,
    /// Queries to run.
    pub queries: QueryInput,
    /// Matching mode.
    pub mode: Mode,
    /// Whether names, strings and text compare case-insensitively.
    pub case_insensitive: bool,
    /// Parser name, resolved with [`adapter_by_name`].
    pub parser: String,
    /// Cancellation flag shared with the caller.
    pub hard_stop_flag: Option<HardStopFlag>,
    /// Stops the run once this many matches were found.
    pub max_results_limit: Option<usize>,
    /// Receives per-file batches while the run progresses.
    pub on_partial_result: Option<PartialResultCallback>,
    /// Emits step-by-step debug events.
    pub debug: bool,
    /// Compiled queries shared between runs.
    pub query_cache: Option<Arc<QueryCache>>,
    /// Capacity of the per-run wildcard pattern cache.
    pub regex_cache_capacity: usize,
}

impl FileSystemSearchArgs {
    /// Creates arguments searching `file_paths` for `query_codes` in include
    /// mode with the TypeScript parser.
    #[must_use]
    pub fn new<P, Q>(file_paths: impl IntoIterator<Item = P>, query_codes: impl IntoIterator<Item = Q>) -> Self
    where
        P: Into<PathBuf>,
        Q: Into<String>,
    {
        Self {
            file_paths: file_paths.into_iter().map(Into::into).collect(),
            queries: QueryInput::Codes(query_codes.into_iter().map(Into::into).collect()),
            mode: Mode::default(),
            case_insensitive: false,
            parser: SupportedLanguage::default().as_str().to_owned(),
            hard_stop_flag: None,
            max_results_limit: None,
            on_partial_result: None,
            debug: false,
            query_cache: None,
            regex_cache_capacity: DEFAULT_PATTERN_CACHE_CAPACITY,
        }
    }

    /// Replaces the queries with compiled ones.
    #[must_use]
    pub fn with_parsed_queries(mut self, queries: Vec<ParsedQuery>) -> Self {
        self.queries = QueryInput::Parsed(queries);
        self
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

    /// Attaches a cancellation flag.
    #[must_use]
    pub fn with_hard_stop_flag(mut self, flag: HardStopFlag) -> Self {
        self.hard_stop_flag = Some(flag);
        self
    }

    /// Caps the number of reported matches.
    #[must_use]
    pub const fn with_max_results_limit(mut self, limit: usize) -> Self {
        self.max_results_limit = Some(limit);
        self
    }

    /// Registers a callback for per-file batches.
    #[must_use]
    pub fn with_partial_result_callback(
        mut self,
        callback: impl Fn(&[MatchWithFileInfo]) + Send + Sync + 'static,
    ) -> Self {
        self.on_partial_result = Some(Arc::new(callback));
        self
    }

    /// Enables debug events.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Shares a query cache with other runs.
    #[must_use]
    pub fn with_query_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.query_cache = Some(cache);
        self
    }

    /// Applies cache capacities from configuration.
    ///
    /// A query cache is created unless one was already attached.
    #[must_use]
    pub fn with_config(mut self, config: &SearchConfig) -> Self {
        self.regex_cache_capacity = config.regex_cache_capacity;
        if self.query_cache.is_none() {
            self.query_cache = Some(Arc::new(QueryCache::new(config.query_cache_capacity)));
        }
        self
    }

    fn is_stopped(&self) -> bool {
        self.hard_stop_flag
            .as_ref()
            .is_some_and(HardStopFlag::is_stopped)
    }

    fn limit_reached(&self, found: usize) -> bool {
        self.max_results_limit.is_some_and(|limit| found >= limit)
    }
}

impl fmt::Debug for FileSystemSearchArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSystemSearchArgs")
            .field("file_paths", &self.file_paths.len())
            .field("queries", &self.queries.codes())
            .field("mode", &self.mode)
            .field("case_insensitive", &self.case_insensitive)
            .field("parser", &self.parser)
            .field("max_results_limit", &self.max_results_limit)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

/// Searches files on disk on the calling thread.
///
/// # Errors
///
/// Returns a [`SearchFailure`] for an unknown parser, a grammar that cannot
/// be loaded or a broken adapter contract.
pub fn search_in_file_system(args: &FileSystemSearchArgs) -> Result<SearchResults, SearchFailure> {
    search_with_loader(args, &FsLoader)
}

/// Searches `args.file_paths`, reading content through `loader`.
///
/// # Errors
///
/// See [`search_in_file_system`].
pub fn search_with_loader(
    args: &FileSystemSearchArgs,
    loader: &dyn SourceLoader,
) -> Result<SearchResults, SearchFailure> {
    let logger = SearchLogger::new(args.debug);
    let results = if args.mode.is_structural() {
        run_structural(args, loader, &logger)?
    } else {
        run_text(args, loader, &logger)
    };
    tracing::debug!(
        target: "sift::search",
        files = args.file_paths.len(),
        matches = results.matches.len(),
        errors = results.errors.len(),
        mode = %args.mode,
        "search finished"
    );
    logger.log_metrics();
    Ok(results)
}

/// Compiles the structural queries of a run.
pub(crate) fn compile_queries(args: &FileSystemSearchArgs, adapter: &dyn ParserAdapter) -> Vec<ParsedQuery> {
    match &args.queries {
        QueryInput::Parsed(parsed) => parsed.clone(),
        QueryInput::Codes(codes) => match &args.query_cache {
            Some(cache) => cache.parse_all(codes, args.case_insensitive, adapter).0,
            None => parse_queries(codes, args.case_insensitive, adapter).0,
        },
    }
}

fn run_structural(
    args: &FileSystemSearchArgs,
    loader: &dyn SourceLoader,
    logger: &SearchLogger,
) -> Result<SearchResults, SearchFailure> {
    let adapter = adapter_by_name(&args.parser)?;
    let queries = {
        let _timing = logger.measure("parse_query");
        compile_queries(args, adapter)
    };

    let mut results = SearchResults {
        hints: queries.iter().map(|query| query.hints.clone()).collect(),
        errors: queries
            .iter()
            .filter_map(|query| {
                query
                    .error
                    .clone()
                    .map(|error| SearchError::query(query.query_code.clone(), error))
            })
            .collect(),
        ..SearchResults::default()
    };
    let valid: Vec<&ParsedQuery> = queries.iter().filter(|query| query.node().is_some()).collect();
    if valid.is_empty() {
        return Ok(results);
    }

    let patterns = PatternCache::new(args.regex_cache_capacity);
    let settings = SearchSettings {
        mode: args.mode,
        case_insensitive: args.case_insensitive,
        adapter,
        logger,
        patterns: &patterns,
    };
    let flow = drive(args, loader, &mut results, |path, content| {
        search_file_content(path, content, &valid, &settings)
    })?;
    Ok(flow.finish(results))
}

fn run_text(args: &FileSystemSearchArgs, loader: &dyn SourceLoader, logger: &SearchLogger) -> SearchResults {
    let mut results = SearchResults::default();
    let mut compiled = Vec::new();
    {
        let _timing = logger.measure("parse_query");
        for code in args.queries.codes() {
            match TextQuery::compile(code, args.case_insensitive) {
                Ok(query) => compiled.push(query),
                Err(error) => results.errors.push(SearchError::query(code, error)),
            }
        }
    }
    if compiled.is_empty() {
        return results;
    }

    let outcome = drive(args, loader, &mut results, |path, content| {
        Ok(search_text_content(path, content, &compiled))
    });
    match outcome {
        Ok(flow) => flow.finish(results),
        Err(failure) => {
            tracing::warn!(target: "sift::search", error = %failure, "text search aborted");
            results
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Completed,
    Stopped,
}

impl Flow {
    fn finish(self, results: SearchResults) -> SearchResults {
        match self {
            Self::Completed => results,
            Self::Stopped => SearchResults::default(),
        }
    }
}

fn drive(
    args: &FileSystemSearchArgs,
    loader: &dyn SourceLoader,
    results: &mut SearchResults,
    mut search_file: impl FnMut(&Path, &str) -> Result<Vec<MatchWithFileInfo>, FileError>,
) -> Result<Flow, SearchFailure> {
    for path in &args.file_paths {
        if args.is_stopped() {
            tracing::debug!(target: "sift::search", "search stopped");
            return Ok(Flow::Stopped);
        }
        if args.limit_reached(results.matches.len()) {
            break;
        }

        let content = match loader.load(path) {
            Ok(content) => content,
            Err(error) => {
                tracing::debug!(target: "sift::search", path = %path.display(), %error, "file unreadable");
                results.errors.push(SearchError::file(path, error.to_string()));
                continue;
            }
        };

        let found = match search_file(path, &content) {
            Ok(found) => dedup_matches(found),
            Err(FileError::Syntax(error)) => {
                tracing::debug!(target: "sift::search", path = %path.display(), %error, "file skipped");
                results.errors.push(SearchError::file(path, error.to_string()));
                continue;
            }
            Err(FileError::Fatal(failure)) => return Err(failure),
        };
        if found.is_empty() {
            continue;
        }
        if let Some(callback) = &args.on_partial_result {
            callback(found.as_slice());
        }
        results.matches.extend(found);
    }

    if args.is_stopped() {
        return Ok(Flow::Stopped);
    }
    if let Some(limit) = args.max_results_limit {
        results.matches.truncate(limit);
    }
    Ok(Flow::Completed)
}
