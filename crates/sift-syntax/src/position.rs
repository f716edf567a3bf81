//! Position conversion helpers.
//!
//! Tree-sitter positions are zero-based. Match locations use one-based lines
//! and zero-based byte columns; syntax errors use one-based lines and columns.

/// A line and column inside a source file.
///
/// `line` is one-based, `column` is a zero-based byte offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPosition {
    /// One-based line number.
    pub line: u32,
    /// Zero-based byte column.
    pub column: u32,
}

impl TextPosition {
    /// Creates a position from a one-based line and zero-based column.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl From<tree_sitter::Point> for TextPosition {
    fn from(point: tree_sitter::Point) -> Self {
        Self {
            line: saturating_u32(point.row.saturating_add(1)),
            column: saturating_u32(point.column),
        }
    }
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
#[must_use]
pub(crate) fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    (
        saturating_u32(pos.row.saturating_add(1)),
        saturating_u32(pos.column.saturating_add(1)),
    )
}

// Line/column numbers will realistically never exceed u32::MAX.
fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_sitter_points_become_one_based_lines() {
        let position = TextPosition::from(tree_sitter::Point { row: 0, column: 4 });
        assert_eq!(position, TextPosition::new(1, 4));
    }

    #[test]
    fn display_coordinates_are_one_based() {
        assert_eq!(
            point_to_one_based(tree_sitter::Point { row: 2, column: 0 }),
            (3, 1)
        );
    }
}
