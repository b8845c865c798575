use anyhow::Result;
use ignore::{DirEntry, WalkBuilder};
use log::debug;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Collects Org documents sitting next to a target, as companion candidates.
///
/// Only `dir` itself is searched; hidden files and ignored paths are skipped.
pub fn collect_companions(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut builder = WalkBuilder::new(dir);
    builder.max_depth(Some(1)).hidden(true);

    let mut candidates = Vec::new();

    for result in builder.build() {
        match result {
            Ok(entry) => {
                if is_org_file(&entry) {
                    candidates.push(entry.into_path());
                }
            }
            Err(err) => {
                debug!("Error walking path: {err}");
            }
        }
    }

    candidates.sort();
    Ok(candidates)
}

fn is_org_file(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|t| t.is_file())
        && entry.path().extension().and_then(OsStr::to_str) == Some("org")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_collect_companions() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.org"), "* Readme").unwrap();
        fs::write(dir.path().join("NOTES.org"), "* Notes").unwrap();
        fs::write(dir.path().join("foo.el"), ";;; foo").unwrap();
        fs::write(dir.path().join(".hidden.org"), "* Hidden").unwrap();
        fs::create_dir(dir.path().join("doc")).unwrap();
        fs::write(dir.path().join("doc/deep.org"), "* Deep").unwrap();

        let found = collect_companions(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("NOTES.org"), dir.path().join("README.org")]
        );
    }
}
