//! Detects whether another writer currently holds a target file.

use fs2::FileExt;
use log::debug;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Path of the editor lock entry for `path` (`.#<file name>` beside it).
pub fn lock_entry_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_string_lossy();
    Some(path.with_file_name(format!(".#{name}")))
}

/// Returns true when the target is held by another session.
///
/// Two kinds of holders are recognised: an editor lock entry beside the file
/// (usually a dangling symlink naming its owner), and an exclusive advisory
/// lock on the file itself. A missing file is never locked.
pub fn is_locked(path: &Path) -> io::Result<bool> {
    if let Some(entry) = lock_entry_path(path) {
        // symlink_metadata so a dangling owner symlink still counts
        if fs::symlink_metadata(&entry).is_ok() {
            let owner = fs::read_link(&entry)
                .map(|t| t.display().to_string())
                .unwrap_or_else(|_| "unknown owner".to_string());
            debug!("{} is locked by {owner}", path.display());
            return Ok(true);
        }
    }

    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    match file.try_lock_exclusive() {
        Ok(()) => {
            file.unlock()?;
            Ok(false)
        }
        Err(err) if err.kind() == fs2::lock_contended_error().kind() => {
            debug!("{} holds an exclusive lock", path.display());
            Ok(true)
        }
        Err(err) => Err(err),
    }
}
