//! Delivers the spliced text to an open buffer or to disk.

use crate::buffer::BufferSet;
use crate::lock::is_locked;
use crate::utils::parent_dir;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Where the updated text ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    /// An open buffer visiting the target was updated in memory.
    UpdatedBuffer,
    /// The file on disk was rewritten.
    Written,
    /// Another writer holds the file; nothing was written.
    Locked,
}

/// A text update for one target.
#[derive(Debug, Clone, Copy)]
pub struct Delivery<'a> {
    pub path: &'a Path,
    pub text: &'a str,
    /// Replaced region `(start, end)` in the previous text.
    pub old_region: (usize, usize),
    /// Length of the region that replaced it.
    pub new_len: usize,
}

/// Routes `delivery` to an open buffer for its path, or else to the file.
///
/// An open buffer takes precedence over the file on disk.
pub fn deliver(delivery: Delivery<'_>, buffers: &mut BufferSet) -> Result<SinkOutcome> {
    if let Some(buffer) = buffers.find_mut(delivery.path) {
        buffer.replace_contents(
            delivery.text.to_owned(),
            delivery.old_region,
            delivery.new_len,
        );
        info!("Updated open buffer for {}", delivery.path.display());
        return Ok(SinkOutcome::UpdatedBuffer);
    }

    if is_locked(delivery.path)
        .with_context(|| format!("Failed to check lock on {}", delivery.path.display()))?
    {
        warn!(
            "{} is locked by another session; leaving it untouched",
            delivery.path.display()
        );
        return Ok(SinkOutcome::Locked);
    }

    write_replacing(delivery.path, delivery.text)?;
    info!("Wrote {}", delivery.path.display());
    Ok(SinkOutcome::Written)
}

/// Replaces the file at `path` with `text` in a single rename.
pub fn write_replacing(path: &Path, text: &str) -> Result<()> {
    let dir = parent_dir(path);
    let mut temp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;

    temp.write_all(text.as_bytes())
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp.as_file()
        .sync_all()
        .with_context(|| format!("Failed to flush temporary file for {}", path.display()))?;

    if let Ok(metadata) = std::fs::metadata(path) {
        debug!("Keeping permissions of {}", path.display());
        temp.as_file()
            .set_permissions(metadata.permissions())
            .with_context(|| format!("Failed to copy permissions of {}", path.display()))?;
    }

    temp.persist(path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Buffer;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_deliver_to_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foo.el");
        fs::write(&path, "old").unwrap();

        let outcome = deliver(
            Delivery {
                path: &path,
                text: "new",
                old_region: (0, 3),
                new_len: 3,
            },
            &mut BufferSet::new(),
        )
        .unwrap();

        assert_eq!(outcome, SinkOutcome::Written);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_deliver_prefers_open_buffer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foo.el");
        fs::write(&path, "old").unwrap();

        let mut buffers = BufferSet::new();
        buffers.open(Buffer::visiting(&path, "old"));

        let outcome = deliver(
            Delivery {
                path: &path,
                text: "new",
                old_region: (0, 3),
                new_len: 3,
            },
            &mut buffers,
        )
        .unwrap();

        assert_eq!(outcome, SinkOutcome::UpdatedBuffer);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        let buffer = buffers.find(&path).unwrap();
        assert_eq!(buffer.text(), "new");
        assert!(buffer.is_modified());
    }

    #[test]
    fn test_deliver_skips_locked_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foo.el");
        fs::write(&path, "old").unwrap();
        fs::write(dir.path().join(".#foo.el"), "other@host.1").unwrap();

        let outcome = deliver(
            Delivery {
                path: &path,
                text: "new",
                old_region: (0, 3),
                new_len: 3,
            },
            &mut BufferSet::new(),
        )
        .unwrap();

        assert_eq!(outcome, SinkOutcome::Locked);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_replacing_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("run.el");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        write_replacing(&path, "new").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }
}
