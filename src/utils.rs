use std::path::{Component, Path, PathBuf};

/// Expresses `path` relative to the directory `base`.
///
/// Both paths are expected to be absolute (or both relative to the same
/// root). Falls back to `path` unchanged when no relative form exists, e.g.
/// across Windows drive prefixes.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    let base: Vec<Component> = base.components().filter(|c| *c != Component::CurDir).collect();
    let target: Vec<Component> = path.components().filter(|c| *c != Component::CurDir).collect();

    if base.first() != target.first() {
        return path.to_path_buf();
    }

    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut rel = PathBuf::new();
    for _ in common..base.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    rel
}

/// Resolves `path` against `base` unless it is already absolute.
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Removes `.` and folds `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let folded = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if folded {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Directory containing `path`; `.` for bare file names.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Renders a path with forward slashes for storing inside a file.
pub fn portable_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_sibling() {
        assert_eq!(
            relative_path(Path::new("/p/lisp"), Path::new("/p/lisp/README.org")),
            PathBuf::from("README.org")
        );
    }

    #[test]
    fn test_relative_path_parent() {
        assert_eq!(
            relative_path(Path::new("/p/lisp"), Path::new("/p/docs/README.org")),
            PathBuf::from("../docs/README.org")
        );
    }

    #[test]
    fn test_relative_path_ignores_cur_dir() {
        assert_eq!(
            relative_path(Path::new("./p"), Path::new("p/a.org")),
            PathBuf::from("a.org")
        );
    }

    #[test]
    fn test_resolve_against() {
        assert_eq!(
            resolve_against(Path::new("/p"), Path::new("a.org")),
            PathBuf::from("/p/a.org")
        );
        assert_eq!(
            resolve_against(Path::new("/p"), Path::new("/q/a.org")),
            PathBuf::from("/q/a.org")
        );
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/p/lisp/../docs/./a.org")),
            PathBuf::from("/p/docs/a.org")
        );
        assert_eq!(normalize(Path::new("../a.org")), PathBuf::from("../a.org"));
        assert_eq!(normalize(Path::new("/../a.org")), PathBuf::from("/a.org"));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("foo.el")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/p/foo.el")), PathBuf::from("/p"));
    }

    #[test]
    fn test_portable_path() {
        assert_eq!(
            portable_path(Path::new("../docs/README.org")),
            "../docs/README.org"
        );
    }
}
