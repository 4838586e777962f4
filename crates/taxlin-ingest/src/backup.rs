//! Backup-before-overwrite for output files

use std::path::{Path, PathBuf};

use taxlin_common::Result;
use tracing::info;

/// Backup name for `path` with counter `n`: `dir/#name.n#`
pub fn backup_path(path: &Path, n: usize) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("#{}.{}#", name, n))
}

/// Rename an existing file at `path` aside as `#name.n#`
///
/// `n` starts at 1 and is the first number without an existing backup.
/// Returns the backup path, or `None` when there was nothing to back up.
pub fn maybe_backup_file(path: &Path) -> Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut count = 1;
    let mut backup = backup_path(path, count);
    while backup.exists() {
        count += 1;
        backup = backup_path(path, count);
    }

    info!(from = %path.display(), to = %backup.display(), "Backing up existing file");
    std::fs::rename(path, &backup)?;
    Ok(Some(backup))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("out/lineages.csv.gz"), 2),
            PathBuf::from("out/#lineages.csv.gz.2#")
        );
        assert_eq!(backup_path(Path::new("some_file"), 1), PathBuf::from("#some_file.1#"));
    }

    #[test]
    fn test_no_backup_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("some_non_existing_file");

        assert_eq!(maybe_backup_file(&path).unwrap(), None);
    }

    #[test]
    fn test_backup_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("some_existing_file");
        std::fs::write(&path, "old").unwrap();

        let backup = maybe_backup_file(&path).unwrap().unwrap();

        assert_eq!(backup, dir.path().join("#some_existing_file.1#"));
        assert!(!path.exists());
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "old");
    }

    #[test]
    fn test_backup_skips_taken_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("some_existing_file");
        std::fs::write(&path, "newer").unwrap();
        std::fs::write(dir.path().join("#some_existing_file.1#"), "older").unwrap();

        let backup = maybe_backup_file(&path).unwrap().unwrap();

        assert_eq!(backup, dir.path().join("#some_existing_file.2#"));
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "newer");
    }
}
