//! Tree-sitter front end for the Sift structural search engine.
//!
//! This crate turns source text into the parser-agnostic [`GenericNode`]
//! tree the matcher walks. It provides:
//!
//! - **Language selection** via [`SupportedLanguage`], mapping parser names
//!   and file extensions onto Tree-sitter grammars
//! - **Parsing** via [`Parser`], which reports the first syntax error with a
//!   one-based location
//! - **Tree conversion** via [`TreeOptions`] and [`build_generic_tree`]
//!
//! # Supported Languages
//!
//! - TypeScript and JavaScript, including JSX (`.ts`, `.tsx`, `.js`, `.jsx`)
//! - Python (`.py`, `.pyi`)
//! - Rust (`.rs`)
//!
//! # Example
//!
//! ```
//! use sift_syntax::{Parser, SupportedLanguage, TreeOptions};
//!
//! let mut parser = Parser::new(SupportedLanguage::TypeScript)?;
//! let root = parser.parse_generic("console.log(1);", &TreeOptions::new())?;
//! assert_eq!(root.kind(), "program");
//! # Ok::<(), sift_syntax::SyntaxError>(())
//! ```

mod error;
mod language;
mod parser;
mod position;
mod tree;

pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use position::TextPosition;
pub use tree::{
    CHILDREN_FIELD, Field, FieldValue, GenericNode, LeafDecoder, NodeSpan, Scalar, TEXT_FIELD,
    TreeOptions, VALUE_FIELD, build_generic_tree,
};

#[cfg(test)]
mod tests;
