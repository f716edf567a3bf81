//! Sift: structural code search backed by Tree-sitter.
//!
//! Queries are written as ordinary source code with wildcards. Each query is
//! parsed with the grammar of the files being searched and matched against
//! their syntax trees, so formatting, quoting style and (in include modes)
//! unmentioned parts of the code do not affect the result.
//!
//! This crate re-exports the data model of [`sift_core`] and provides the
//! engine: parser adapters, wildcard handling, the comparator pipeline, the
//! query compiler and the search entry points.
//!
//! # Wildcards
//!
//! - `$$` matches any identifier, or any (possibly empty) part of a string
//! - `$$$` matches any node subtree, or a non-empty part of a string
//! - `0x0` matches any number
//! - `$$_name` and `$$$_name` bind an alias; repeated aliases must match the
//!   same text
//!
//! # Entry points
//!
//! - [`search_in_file_system`] searches files on the calling thread
//! - [`search_multi_thread`] fans a search out across worker threads
//! - [`search_in_strings`] searches in-memory content
//! - [`parse_queries`] compiles queries ahead of time
//! - [`compare_code`] compares two snippets structurally
//!
//! # Example
//!
//! ```
//! use sift::{FileInMemory, Mode, StringsSearchArgs, search_in_strings};
//!
//! let files = vec![FileInMemory::new("app.ts", "console.log('a');\nconsole.log('b', 1);")];
//! let args = StringsSearchArgs::new(files, ["console.log()"]).with_mode(Mode::Include);
//! let results = search_in_strings(&args)?;
//! assert_eq!(results.matches.len(), 2);
//! # Ok::<(), sift::SearchFailure>(())
//! ```

pub mod adapter;
mod error;
mod hard_stop;
pub mod logger;
mod match_context;
pub mod matcher;
pub mod query;
mod search;
mod shallow;
pub mod telemetry;
pub mod text_search;
pub mod wildcard;

pub use sift_core::{
    ConfigError, DEFAULT_LOG_FILTER, ExtendedCodeFrame, Hint, HintToken, HintTokenKind, Location,
    LogFormat, MatchAliases, MatchWithFileInfo, Mode, ModeParseError, Position, QueryParseError,
    SearchConfig, SearchError, SearchResults, ThreadingConfig,
};
pub use sift_syntax::{GenericNode, SupportedLanguage, SyntaxError};

pub use adapter::{ParserAdapter, adapter_by_name, adapter_for};
pub use error::SearchFailure;
pub use hard_stop::{HardStopFlag, create_hard_stop_flag};
pub use match_context::{MatchContext, NodeAlias, TextAlias};
pub use matcher::{compare_code, compare_nodes, traverse_and_match, validate_match};
pub use query::{ParsedQuery, QueryCache, parse_queries};
pub use search::{
    FileInMemory, FileSystemSearchArgs, FsLoader, MemoryLoader, PartialResultCallback, QueryInput,
    SourceLoader, StringsSearchArgs, plan_chunks, search_in_file_system, search_in_strings,
    search_multi_thread, search_with_loader,
};
pub use shallow::shallow_search;

#[cfg(test)]
mod tests;
