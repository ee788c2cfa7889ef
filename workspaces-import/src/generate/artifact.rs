//! Writing generated files to disk

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Permission bits for the management script
pub const EXECUTABLE: u32 = 0o755;

/// Write `content` to `path`, replacing any existing file, then apply `mode`
/// when given. Modes are ignored on non-Unix platforms.
pub fn write_artifact(path: &Path, content: &str, mode: Option<u32>) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    if let Some(mode) = mode {
        set_mode(path, mode)?;
    }

    log::debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

/// Create `dir` and any missing parents. Existing directories are fine.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");

        write_artifact(&path, "first version, longer", None).unwrap();
        write_artifact(&path, "second", None).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.sh");
        write_artifact(&path, "#!/bin/bash\n", Some(EXECUTABLE)).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("file.txt");

        let err = write_artifact(&path, "x", None).unwrap_err();
        assert!(err.to_string().contains("Failed to write"));
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
