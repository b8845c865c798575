//! Companion-path cache stored in the target's trailing local-variables block.
//!
//! Emacs reads per-file settings from a block near the end of a file:
//!
//! ```text
//! ;; Local Variables:
//! ;; org2comment-source: "README.org"
//! ;; End:
//! ```
//!
//! Only that block format is understood here; `-*-` first-line settings are
//! ignored. The cached value is always a path relative to the target's
//! directory.

use crate::utils::{portable_path, resolve_against};
use log::debug;
use std::path::{Path, PathBuf};

/// Key under which the companion path is stored.
pub const CACHE_KEY: &str = "org2comment-source";

const BLOCK_LABEL: &str = "Local Variables:";
const END_LABEL: &str = "End:";

/// Only this many trailing bytes are searched for the block.
const SEARCH_WINDOW: usize = 3000;

/// A parsed `Local Variables:` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariables {
    /// Text before the label on the opening line, e.g. `;; `.
    pub prefix: String,
    /// Text after the label on the opening line, usually empty.
    pub suffix: String,
    /// Entries in file order, values unquoted.
    pub entries: Vec<(String, String)>,
    /// Byte offset where the line holding `Local Variables:` starts.
    start_line: usize,
    /// Byte offset where the line holding `End:` starts.
    end_line: usize,
}

impl LocalVariables {
    /// Finds and parses the trailing block of `text`.
    pub fn parse(text: &str) -> Option<Self> {
        let mut window_start = text.len().saturating_sub(SEARCH_WINDOW);
        while !text.is_char_boundary(window_start) {
            window_start += 1;
        }

        let label_at = window_start + text[window_start..].rfind(BLOCK_LABEL)?;
        let line_start = text[..label_at].rfind('\n').map_or(0, |i| i + 1);
        let line_end = text[label_at..]
            .find('\n')
            .map_or(text.len(), |i| label_at + i);

        let prefix = text[line_start..label_at].to_string();
        let suffix = text[label_at + BLOCK_LABEL.len()..line_end]
            .trim_end_matches('\r')
            .to_string();

        let mut entries = Vec::new();
        let mut offset = (line_end + 1).min(text.len());

        while offset < text.len() {
            let next = text[offset..].find('\n').map_or(text.len(), |i| offset + i + 1);
            let raw = text[offset..next].trim_end_matches(['\n', '\r']);

            let body = raw.strip_prefix(prefix.as_str())?;
            let body = body.strip_suffix(suffix.as_str()).unwrap_or(body).trim();

            if body == END_LABEL {
                return Some(Self {
                    prefix,
                    suffix,
                    entries,
                    start_line: line_start,
                    end_line: offset,
                });
            }

            if let Some((key, value)) = body.split_once(':') {
                entries.push((key.trim().to_string(), unquote(value.trim())));
            }

            offset = next;
        }

        debug!("Local Variables block has no End: line");
        None
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn entry_line(&self, key: &str, value: &str) -> String {
        format!("{}{key}: {}{}\n", self.prefix, quote(value), self.suffix)
    }
}

/// Reads the cached companion path and resolves it against `target_dir`.
///
/// Returns `None` when nothing is cached or when the cached file no longer
/// exists. A stale value is left in place.
pub fn get_cached(text: &str, target_dir: &Path) -> Option<PathBuf> {
    let stored = cached_value(text)?;
    let resolved = resolve_against(target_dir, Path::new(&stored));

    if resolved.is_file() {
        Some(resolved)
    } else {
        debug!(
            "Cached companion {} no longer exists; ignoring it",
            resolved.display()
        );
        None
    }
}

/// Raw cached value, without resolving or checking it.
pub fn cached_value(text: &str) -> Option<String> {
    LocalVariables::parse(text)?.get(CACHE_KEY).map(str::to_owned)
}

/// Returns `text` with the cache entry set to `relative_path`.
///
/// An existing entry is rewritten in place; otherwise the entry goes right
/// before `End:`. Without a block, a new one is appended to the text.
pub fn set_cached(text: &str, relative_path: &Path) -> String {
    let value = portable_path(relative_path);

    let Some(block) = LocalVariables::parse(text) else {
        let mut out = text.to_string();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&format!(";; {BLOCK_LABEL}\n"));
        out.push_str(&format!(";; {CACHE_KEY}: {}\n", quote(&value)));
        out.push_str(&format!(";; {END_LABEL}\n"));
        return out;
    };

    let new_line = block.entry_line(CACHE_KEY, &value);

    if let Some((start, end)) = find_entry_line(text, &block, CACHE_KEY) {
        return format!("{}{}{}", &text[..start], new_line, &text[end..]);
    }

    format!(
        "{}{}{}",
        &text[..block.end_line],
        new_line,
        &text[block.end_line..]
    )
}

/// Byte range of the block line holding `key`, terminator included.
fn find_entry_line(text: &str, block: &LocalVariables, key: &str) -> Option<(usize, usize)> {
    let body = &text[block.start_line..block.end_line];
    let mut found = None;
    let mut offset = block.start_line;

    for line in body.split_inclusive('\n') {
        let body = line
            .trim_end_matches(['\n', '\r'])
            .strip_prefix(block.prefix.as_str())
            .map(str::trim_start);
        if let Some(body) = body {
            if let Some((k, _)) = body.split_once(':') {
                if k.trim() == key {
                    found = Some((offset, offset + line.len()));
                }
            }
        }
        offset += line.len();
    }

    found
}

fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(ch);
        }
    }
    out
}
