//! Match modes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How strictly a query must correspond to the code it matches.
///
/// Structural modes differ only in how node lists are compared:
///
/// - `Exact`: lists have equal length and match pairwise in order
/// - `Include`: every query element matches a distinct file element
/// - `IncludeWithOrder`: as `Include`, with file elements in query order
///
/// `Text` bypasses parsing and matches whitespace-normalised source text.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Mode {
    /// Lists must match element for element.
    Exact,
    /// Query lists may be a subset of file lists.
    #[default]
    Include,
    /// Query lists may be an ordered subset of file lists.
    IncludeWithOrder,
    /// Raw text matching.
    Text,
}

impl Mode {
    /// Returns whether the mode matches parsed trees rather than text.
    #[must_use]
    pub const fn is_structural(self) -> bool {
        !matches!(self, Self::Text)
    }

    /// Returns whether node lists may contain unmatched file elements.
    #[must_use]
    pub const fn is_include(self) -> bool {
        matches!(self, Self::Include | Self::IncludeWithOrder)
    }

    /// Returns every mode.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Exact, Self::Include, Self::IncludeWithOrder, Self::Text]
    }
}

/// Errors encountered while parsing a [`Mode`] from text.
pub type ModeParseError = strum::ParseError;
