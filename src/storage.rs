//! Storage helpers for replicated attachment content on disk.

use std::path::{Path, PathBuf};

/// A file written to disk, with its collision-resolved name.
#[derive(Debug, Clone)]
pub struct SavedFile {
    /// Full path of the written file.
    pub path: PathBuf,
    /// Final filename after collision resolution.
    pub file_name: String,
}

/// Create a directory and all missing ancestors. Idempotent.
pub fn ensure_directory(path: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(path)
}

/// Find a path in `directory` for `filename` that does not collide with an
/// existing file.
///
/// Returns `directory/filename` unchanged when it is free; otherwise probes
/// `stem(1).ext`, `stem(2).ext`, ... from 1 upward and returns the first
/// free candidate.
///
/// The check-then-create sequence is racy under concurrent writers to the
/// same directory; callers are single-threaded. A concurrent rework would
/// need `OpenOptions::create_new` retried on collision instead.
pub fn unique_path(directory: &Path, filename: &str) -> PathBuf {
    let target = directory.join(filename);
    if !target.exists() {
        return target;
    }

    let (stem, suffix) = split_filename(filename);
    let mut counter: u64 = 1;
    loop {
        let candidate = directory.join(format!("{stem}({counter}){suffix}"));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Split a filename into stem and suffix, the suffix keeping its dot.
///
/// `report.pdf` -> `("report", ".pdf")`, `archive.tar.gz` ->
/// `("archive.tar", ".gz")`, `README` -> `("README", "")`. A leading dot
/// (`.env`) is part of the stem, not a suffix.
fn split_filename(filename: &str) -> (&str, &str) {
    match filename.rfind('.') {
        Some(pos) if pos > 0 => filename.split_at(pos),
        _ => (filename, ""),
    }
}

/// Write attachment bytes under `directory`, never overwriting an existing
/// file.
///
/// The directory is created if missing. I/O failures propagate to the
/// caller; there is no retry and no cleanup of partial writes.
pub fn save_file(directory: &Path, filename: &str, data: &[u8]) -> anyhow::Result<SavedFile> {
    ensure_directory(directory)?;
    let path = unique_path(directory, filename);
    std::fs::write(&path, data)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());

    Ok(SavedFile { path, file_name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_unique_path_no_collision() {
        let dir = tempdir().unwrap();
        let path = unique_path(dir.path(), "report.pdf");
        assert_eq!(path, dir.path().join("report.pdf"));
    }

    #[test]
    fn test_unique_path_single_collision() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"x").unwrap();

        let path = unique_path(dir.path(), "report.pdf");
        assert_eq!(path, dir.path().join("report(1).pdf"));
    }

    #[test]
    fn test_unique_path_counts_past_existing_suffixes() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("report(1).pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("report(2).pdf"), b"x").unwrap();

        let path = unique_path(dir.path(), "report.pdf");
        assert_eq!(path, dir.path().join("report(3).pdf"));
    }

    #[test]
    fn test_unique_path_without_extension() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("README"), b"x").unwrap();

        let path = unique_path(dir.path(), "README");
        assert_eq!(path, dir.path().join("README(1)"));
    }

    #[test]
    fn test_unique_path_multi_dot_filename() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("archive.tar.gz"), b"x").unwrap();

        let path = unique_path(dir.path(), "archive.tar.gz");
        assert_eq!(path, dir.path().join("archive.tar(1).gz"));
    }

    #[test]
    fn test_split_filename_hidden_file() {
        assert_eq!(split_filename(".env"), (".env", ""));
        assert_eq!(split_filename(".env.local"), (".env", ".local"));
    }

    #[test]
    fn test_save_file_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let saved = save_file(&nested, "test.txt", b"data").unwrap();
        assert_eq!(saved.path, nested.join("test.txt"));
        assert_eq!(saved.file_name, "test.txt");
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"data");
    }

    #[test]
    fn test_save_file_never_overwrites() {
        let dir = tempdir().unwrap();

        let first = save_file(dir.path(), "test.txt", b"one").unwrap();
        let second = save_file(dir.path(), "test.txt", b"two").unwrap();

        assert_ne!(first.path, second.path);
        assert_eq!(second.file_name, "test(1).txt");
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"two");
    }
}
