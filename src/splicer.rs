//! Replaces the commentary region with a freshly formatted block.

use std::ops::Range;

use crate::formatter::CommentFormatter;
use crate::locator::RegionBounds;

/// Returns `full` with `bounds` replaced by the commented `block`, together
/// with the byte range the new region occupies in the result.
///
/// The formatted block is always surrounded by one leading and one trailing
/// line break, whatever the old region looked like. Inserted lines end the
/// way the `Commentary:` line does, so CRLF files stay CRLF.
pub fn splice(
    full: &str,
    bounds: RegionBounds,
    block: &str,
    formatter: &CommentFormatter,
) -> (String, Range<usize>) {
    let eol = line_ending(&full[..bounds.start]);
    let mut formatted = formatter.format(block);
    if eol != "\n" {
        formatted = formatted.replace('\n', eol);
    }

    let inserted = bounds.start..bounds.start + eol.len() + formatted.len() + eol.len();

    let mut out = String::with_capacity(full.len() - bounds.len() + inserted.len());
    out.push_str(&full[..bounds.start]);
    out.push_str(eol);
    out.push_str(&formatted);
    out.push_str(eol);
    out.push_str(&full[bounds.end..]);
    (out, inserted)
}

fn line_ending(head: &str) -> &'static str {
    if head.ends_with("\r\n") { "\r\n" } else { "\n" }
}
