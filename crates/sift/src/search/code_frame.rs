//! Rendering of matched source text.

use std::ops::Range;
use std::path::Path;

use sift_core::{ExtendedCodeFrame, Location, MatchAliases, MatchWithFileInfo};

/// Matched code with the first line's indentation removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderedCode {
    pub code: String,
    pub indentation_base: usize,
}

fn line_start(content: &str, offset: usize) -> usize {
    content
        .get(..offset)
        .and_then(|before| before.rfind('\n'))
        .map_or(0, |newline| newline.saturating_add(1))
}

fn line_end(content: &str, offset: usize) -> usize {
    content
        .get(offset..)
        .and_then(|after| after.find('\n'))
        .map_or(content.len(), |newline| offset.saturating_add(newline))
}

fn strip_indentation(line: &str, limit: usize) -> &str {
    let cut = line
        .char_indices()
        .take(limit)
        .find(|(_, c)| !c.is_whitespace())
        .map_or_else(
            || line.char_indices().nth(limit).map_or(line.len(), |(index, _)| index),
            |(index, _)| index,
        );
    line.get(cut..).unwrap_or(line)
}

/// Renders `content[range]`, dedented by the indentation of its first line.
pub(crate) fn prepare_code_result(content: &str, range: &Range<usize>) -> RenderedCode {
    let first_line_start = line_start(content, range.start);
    let first_line_end = line_end(content, range.start).min(range.end);
    let first_line = content.get(first_line_start..first_line_end).unwrap_or_default();
    let indentation_base = first_line.chars().take_while(|c| c.is_whitespace()).count();

    let matched = content.get(range.clone()).unwrap_or_default();
    let code = if indentation_base == 0 {
        matched.to_owned()
    } else {
        matched
            .split('\n')
            .map(|line| strip_indentation(line, indentation_base))
            .collect::<Vec<_>>()
            .join("\n")
    };
    RenderedCode {
        code,
        indentation_base,
    }
}

/// Returns the whole lines covering a match, widened by one line on each
/// side for matches shorter than three lines.
pub(crate) fn extended_code_frame(
    content: &str,
    range: &Range<usize>,
    loc: &Location,
) -> ExtendedCodeFrame {
    let mut frame_start = line_start(content, range.start);
    let mut frame_end = line_end(content, range.end);
    let mut start_line = loc.start.line;

    if loc.line_count() < 3 {
        if let Some(previous_line_end) = frame_start.checked_sub(1) {
            frame_start = line_start(content, previous_line_end);
            start_line = start_line.saturating_sub(1);
        }
        if frame_end < content.len() {
            frame_end = line_end(content, frame_end.saturating_add(1));
        }
    }

    ExtendedCodeFrame {
        code: content.get(frame_start..frame_end).unwrap_or_default().to_owned(),
        start_line,
    }
}

/// Assembles the record reported for a match.
pub(crate) fn build_match(
    file_path: &Path,
    content: &str,
    range: Range<usize>,
    loc: Location,
    query: &str,
    aliases: MatchAliases,
) -> MatchWithFileInfo {
    let rendered = prepare_code_result(content, &range);
    let extended_code_frame = extended_code_frame(content, &range, &loc);
    MatchWithFileInfo {
        file_path: file_path.to_path_buf(),
        start: range.start,
        end: range.end,
        loc,
        code: rendered.code,
        query: query.to_owned(),
        extended_code_frame,
        aliases,
        indentation_base: rendered.indentation_base,
    }
}
