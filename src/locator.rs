//! Finds the replaceable region of a target file.
//!
//! The region starts on the line after `;;; Commentary:` and ends right before
//! the `;;; Code:` line that follows it.

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENTARY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^;;;\s*Commentary:\s*$").expect("valid commentary regex"));

static CODE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^;;;\s*Code:\s*$").expect("valid code regex"));

/// Byte offsets of the half-open region `start..end` to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionBounds {
    pub start: usize,
    pub end: usize,
}

impl RegionBounds {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Locates the commentary region in `text`.
///
/// Returns `None` unless both markers are present in order. `Code:` is only
/// searched for after the `Commentary:` line, so a `Code:` marker appearing
/// first is never matched.
pub fn locate(text: &str) -> Option<RegionBounds> {
    let mut lines = lines_with_offsets(text);

    let start = lines
        .by_ref()
        .find(|(_, line)| COMMENTARY_MARKER.is_match(line))
        .map(|(offset, line)| offset + line.len())?;

    // `line` excludes the terminator, so step past it when there is one
    let start = next_line_offset(text, start);

    let end = lines
        .find(|(_, line)| CODE_MARKER.is_match(line))
        .map(|(offset, _)| offset)?;

    Some(RegionBounds { start, end })
}

/// Iterates `(offset, line)` pairs with line terminators (`\n`, `\r\n`) removed.
fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.split_inclusive('\n').scan(0, |offset, raw| {
        let start = *offset;
        *offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Some((start, line))
    })
}

fn next_line_offset(text: &str, line_end: usize) -> usize {
    let rest = &text[line_end..];
    if rest.starts_with("\r\n") {
        line_end + 2
    } else if rest.starts_with('\n') {
        line_end + 1
    } else {
        line_end
    }
}
