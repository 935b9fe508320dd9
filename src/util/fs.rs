//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

/// Check that `path` is a readable directory.
///
/// Unlike `Path::is_dir`, this reports *why* the directory is unusable.
pub fn check_readable_dir(path: &Path) -> io::Result<()> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_dir() {
        return Err(io::Error::other("not a directory"));
    }
    fs::read_dir(path)?;
    Ok(())
}

/// Find regular files under `base` whose file name matches `pattern`.
///
/// The walk is recursive. Symlinks to files are returned (their target is what
/// gets copied), symlinked directories are not descended into. Results are
/// sorted and returned relative to `base`.
pub fn find_matching_files(base: &Path, pattern: &Pattern) -> io::Result<Vec<PathBuf>> {
    let mut results = Vec::new();

    for entry in WalkDir::new(base).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path();

        // Follows symlinks, so `libfoo.so -> libfoo.so.1` counts as a file.
        if !path.is_file() {
            continue;
        }

        let matches = entry
            .file_name()
            .to_str()
            .map(|name| pattern.matches(name))
            .unwrap_or(false);

        if matches {
            results.push(relative_path(base, path));
        }
    }

    results.sort();
    Ok(results)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}
