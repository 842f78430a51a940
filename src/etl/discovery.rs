//! Recursive discovery of the data files under an input root.

use super::error::EtlError;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Returns every regular file under `root` whose extension is `extension`,
/// as absolute paths in lexicographic order.
///
/// The extension is matched exactly and case-sensitively, without the dot.
/// An existing directory with no matching files yields an empty list.
/// Symbolic links are not followed, so every result lies under the
/// canonicalized root.
pub fn discover(root: &Path, extension: &str) -> Result<Vec<PathBuf>, EtlError> {
    if !root.exists() {
        return Err(EtlError::discovery(root, "path does not exist"));
    }
    if !root.is_dir() {
        return Err(EtlError::discovery(root, "not a directory"));
    }

    let base = root
        .canonicalize()
        .map_err(|e| EtlError::discovery(root, e))?;
    let mut files = Vec::new();
    for entry in WalkDir::new(&base) {
        let entry = entry.map_err(|e| EtlError::discovery(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext == extension);
        if !matches {
            continue;
        }
        files.push(entry.into_path());
    }

    files.sort();
    debug!("Discovered {} .{} files under {:?}", files.len(), extension, root);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"{}").unwrap();
    }

    #[test]
    fn finds_nested_files_in_sorted_order() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("B/b.json"));
        touch(&root.join("A/C/c.json"));
        touch(&root.join("a.json"));
        touch(&root.join("A/notes.txt"));

        let files = discover(root, "json").unwrap();
        let root = root.canonicalize().unwrap();
        assert_eq!(
            files,
            vec![
                root.join("A/C/c.json"),
                root.join("B/b.json"),
                root.join("a.json"),
            ]
        );
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        let temp_dir = TempDir::new().unwrap();
        touch(&temp_dir.path().join("upper.JSON"));
        touch(&temp_dir.path().join("lower.json"));

        let files = discover(temp_dir.path(), "json").unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("lower.json"));
    }

    #[test]
    fn empty_directory_yields_no_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("empty")).unwrap();
        assert!(discover(temp_dir.path(), "json").unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = discover(&temp_dir.path().join("missing"), "json").unwrap_err();
        assert!(matches!(err, EtlError::Discovery { .. }));
    }

    #[test]
    fn file_root_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.json");
        touch(&file);
        let err = discover(&file, "json").unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_out_of_root_are_not_followed() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let outside = temp_dir.path().join("outside");
        touch(&root.join("inside.json"));
        touch(&outside.join("secret.json"));
        std::os::unix::fs::symlink(outside.join("secret.json"), root.join("link.json")).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("linked_dir")).unwrap();

        let files = discover(&root, "json").unwrap();
        let root = root.canonicalize().unwrap();
        assert_eq!(files, vec![root.join("inside.json")]);
        assert!(files.iter().all(|f| f.starts_with(&root)));
    }

    #[test]
    fn repeated_discovery_is_identical() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["z.json", "m/n.json", "a/b/c.json"] {
            touch(&temp_dir.path().join(name));
        }
        assert_eq!(
            discover(temp_dir.path(), "json").unwrap(),
            discover(temp_dir.path(), "json").unwrap()
        );
    }
}
