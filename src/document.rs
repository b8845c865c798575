use crate::error::Error;
use anyhow::{Context, Result};
use content_inspector::{ContentType, inspect};
use log::debug;
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use std::str;

/// Reads a whole text document (target or companion) into memory.
///
/// Binary files are refused with [`Error::BinaryDocument`]; invalid UTF-8 is
/// an error, never replaced.
pub fn read_text(path: &Path) -> Result<String> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

    let len = file
        .metadata()
        .with_context(|| format!("Failed to stat file: {}", path.display()))?
        .len();

    if len == 0 {
        debug!("{} is empty", path.display());
        return Ok(String::new());
    }

    let mmap = unsafe {
        MmapOptions::new()
            .map(&file)
            .with_context(|| format!("Failed to mmap file: {}", path.display()))?
    };

    let sample_size = std::cmp::min(8192, mmap.len());
    if inspect(&mmap[..sample_size]) == ContentType::BINARY {
        return Err(Error::BinaryDocument {
            path: path.to_path_buf(),
        }
        .into());
    }

    let text = str::from_utf8(&mmap)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;

    debug!("Read {} bytes from {}", text.len(), path.display());
    Ok(text.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.el");
        fs::write(&path, ";;; Commentary:\n;;; Code:\n").unwrap();
        assert_eq!(read_text(&path).unwrap(), ";;; Commentary:\n;;; Code:\n");
    }

    #[test]
    fn test_read_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.org");
        fs::write(&path, "").unwrap();
        assert_eq!(read_text(&path).unwrap(), "");
    }

    #[test]
    fn test_read_binary_file_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.el");
        fs::write(&path, [0x00, 0xFF, 0xAA, 0x55]).unwrap();

        let err = read_text(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::BinaryDocument { .. })
        ));
    }

    #[test]
    fn test_read_invalid_utf8_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.org");
        fs::write(&path, b"caf\xe9 au lait\n").unwrap();

        let err = read_text(&path).unwrap_err();
        assert!(err.to_string().contains("is not valid UTF-8"));
        assert!(err.to_string().contains("latin1.org"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_text(&dir.path().join("missing.el")).unwrap_err();
        assert!(err.to_string().contains("Failed to open file"));
    }
}
