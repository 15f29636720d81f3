//! Finding query files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{GenError, Result};

fn io(path: &Path) -> impl FnOnce(std::io::Error) -> GenError + '_ {
    move |source| GenError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Whether `path` is a query file: `*.sql`, but not the generated `*.bob.sql`.
fn is_query_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.extension().is_some_and(|ext| ext == "sql") && !name.ends_with(".bob.sql")
}

/// Every folder under `root` (itself included) that holds query files, with those files.
///
/// Folders and files are sorted by path so the output does not depend on the file system.
pub(crate) fn sql_folders(root: &Path) -> Result<Vec<(PathBuf, Vec<PathBuf>)>> {
    let mut out = Vec::new();
    collect(root, &mut out)?;
    Ok(out)
}

fn collect(dir: &Path, out: &mut Vec<(PathBuf, Vec<PathBuf>)>) -> Result<()> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir).map_err(io(dir))? {
        let path = entry.map_err(io(dir))?.path();
        if path.is_dir() {
            dirs.push(path);
        } else if is_query_file(&path) {
            debug!(path = %path.display(), "found query file");
            files.push(path);
        }
    }
    files.sort();
    dirs.sort();
    if !files.is_empty() {
        out.push((dir.to_path_buf(), files));
    }
    for dir in dirs {
        collect(&dir, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_files() {
        assert!(is_query_file(Path::new("q/users.sql")));
        assert!(!is_query_file(Path::new("q/users.bob.sql")));
        assert!(!is_query_file(Path::new("q/users.sql.bak")));
        assert!(!is_query_file(Path::new("q/notes.txt")));
    }

    #[test]
    fn test_walk_sorts_and_skips_empty_folders() {
        let root = tempfile::tempdir().unwrap();
        let write = |rel: &str| {
            let path = root.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "SELECT 1;").unwrap();
        };
        write("b.sql");
        write("a.sql");
        write("gen/models.bob.sql");
        write("nested/deeper/c.sql");
        write("docs/readme.md");

        let folders = sql_folders(root.path()).unwrap();
        let found: Vec<(PathBuf, Vec<PathBuf>)> = folders
            .into_iter()
            .map(|(dir, files)| {
                let rel = |p: &Path| p.strip_prefix(root.path()).unwrap().to_path_buf();
                (rel(&dir), files.iter().map(|f| rel(f)).collect())
            })
            .collect();
        assert_eq!(
            found,
            [
                (PathBuf::new(), vec![PathBuf::from("a.sql"), PathBuf::from("b.sql")]),
                (
                    PathBuf::from("nested/deeper"),
                    vec![PathBuf::from("nested/deeper/c.sql")]
                ),
            ]
        );
    }

    #[test]
    fn test_missing_folder_is_an_io_error() {
        let err = sql_folders(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, GenError::Io { .. }));
    }
}
