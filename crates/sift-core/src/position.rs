//! Locations reported to callers.

use serde::{Deserialize, Serialize};

/// A line and column within a source file.
///
/// `line` is one-based; `column` is a zero-based byte offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// One-based line number.
    pub line: u32,
    /// Zero-based byte column.
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Start and end positions of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    /// Position of the first matched byte.
    pub start: Position,
    /// Position just past the last matched byte.
    pub end: Position,
}

impl Location {
    /// Creates a location from its bounds.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Returns the number of lines the location touches.
    #[must_use]
    pub const fn line_count(&self) -> u32 {
        self.end.line.saturating_sub(self.start.line).saturating_add(1)
    }
}
