//! In-memory documents that stand in for an editor's open buffers.

use std::path::{Path, PathBuf};

/// An open document: its text, an optional visited file, and a cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer {
    path: Option<PathBuf>,
    text: String,
    cursor: usize,
    modified: bool,
}

impl Buffer {
    /// A buffer with no backing file.
    pub fn scratch(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A buffer visiting `path`.
    pub fn visiting(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        self.cursor = self.clamp_to_boundary(cursor);
    }

    /// Replaces the whole text after `old_region` was rewritten as `new_len` bytes.
    ///
    /// A cursor before the region stays put, one after it moves with the text
    /// that follows, and one inside it lands on the region start.
    pub fn replace_contents(&mut self, text: String, old_region: (usize, usize), new_len: usize) {
        let (start, end) = old_region;
        let cursor = if self.cursor < start {
            self.cursor
        } else if self.cursor >= end {
            self.cursor - (end - start) + new_len
        } else {
            start
        };

        self.text = text;
        self.modified = true;
        self.set_cursor(cursor);
    }

    fn clamp_to_boundary(&self, cursor: usize) -> usize {
        let mut cursor = cursor.min(self.text.len());
        while !self.text.is_char_boundary(cursor) {
            cursor -= 1;
        }
        cursor
    }
}

/// The set of buffers currently open, looked up by visited file.
#[derive(Debug, Default)]
pub struct BufferSet {
    buffers: Vec<Buffer>,
}

impl BufferSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, buffer: Buffer) {
        self.buffers.push(buffer);
    }

    /// Finds the buffer visiting `path`, comparing canonical paths when possible.
    pub fn find(&self, path: &Path) -> Option<&Buffer> {
        let wanted = canonical(path);
        self.buffers
            .iter()
            .find(|b| b.path().is_some_and(|p| canonical(p) == wanted))
    }

    pub fn find_mut(&mut self, path: &Path) -> Option<&mut Buffer> {
        let wanted = canonical(path);
        self.buffers
            .iter_mut()
            .find(|b| b.path().is_some_and(|p| canonical(p) == wanted))
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
