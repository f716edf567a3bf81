//! Language detection and Tree-sitter grammar selection.
//!
//! [`SupportedLanguage`] names the grammar families the search engine can
//! parse. JavaScript sources are handled by the TSX grammar, which accepts
//! plain JavaScript and JSX as well as TypeScript.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Grammar families available for structural search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// TypeScript, TSX, JavaScript and JSX sources.
    #[default]
    TypeScript,
    /// Python source files (`.py`, `.pyi`).
    Python,
    /// Rust source files (`.rs`).
    Rust,
}

impl SupportedLanguage {
    /// Detects the language from a file extension.
    ///
    /// Returns `None` if the extension is not recognised.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalised = ext.to_ascii_lowercase();
        match normalised.as_str() {
            "ts" | "tsx" | "mts" | "cts" | "js" | "jsx" | "mjs" | "cjs" => Some(Self::TypeScript),
            "py" | "pyi" => Some(Self::Python),
            "rs" => Some(Self::Rust),
            _ => None,
        }
    }

    /// Detects the language from a file path by examining its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the Tree-sitter grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            // TSX is a superset that also accepts JSX in `.js` files.
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }

    /// Returns the lower-case parser name for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::Python => "python",
            Self::Rust => "rust",
        }
    }

    /// Returns all supported languages.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::TypeScript, Self::Python, Self::Rust]
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a parser name does not map to a supported language.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported parser: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "typescript" | "ts" | "tsx" | "javascript" | "js" => Ok(Self::TypeScript),
            "python" | "py" => Ok(Self::Python),
            "rust" | "rs" => Ok(Self::Rust),
            other => Err(LanguageParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ts", SupportedLanguage::TypeScript)]
    #[case("tsx", SupportedLanguage::TypeScript)]
    #[case("js", SupportedLanguage::TypeScript)]
    #[case("JSX", SupportedLanguage::TypeScript)]
    #[case("py", SupportedLanguage::Python)]
    #[case("pyi", SupportedLanguage::Python)]
    #[case("rs", SupportedLanguage::Rust)]
    fn from_extension_recognises_supported_languages(
        #[case] ext: &str,
        #[case] expected: SupportedLanguage,
    ) {
        assert_eq!(SupportedLanguage::from_extension(ext), Some(expected));
    }

    #[rstest]
    #[case("json")]
    #[case("md")]
    #[case("")]
    fn from_extension_returns_none_for_unknown(#[case] ext: &str) {
        assert_eq!(SupportedLanguage::from_extension(ext), None);
    }

    #[rstest]
    #[case("src/app.tsx", Some(SupportedLanguage::TypeScript))]
    #[case("tools/build.py", Some(SupportedLanguage::Python))]
    #[case("Makefile", None)]
    fn from_path_uses_extension(
        #[case] path: &str,
        #[case] expected: Option<SupportedLanguage>,
    ) {
        assert_eq!(SupportedLanguage::from_path(Path::new(path)), expected);
    }

    #[rstest]
    #[case("typescript", SupportedLanguage::TypeScript)]
    #[case(" JavaScript ", SupportedLanguage::TypeScript)]
    #[case("Python", SupportedLanguage::Python)]
    #[case("RUST", SupportedLanguage::Rust)]
    fn from_str_parses_parser_names(#[case] input: &str, #[case] expected: SupportedLanguage) {
        assert_eq!(SupportedLanguage::from_str(input), Ok(expected));
    }

    #[test]
    fn from_str_reports_unknown_parser() {
        let err = "babel-eslint"
            .parse::<SupportedLanguage>()
            .expect_err("unknown parser");
        assert_eq!(err.input(), "babel-eslint");
    }
}
