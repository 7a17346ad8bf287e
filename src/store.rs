//! Versioned artifact store: atomic publish, `current` links, launchers
//!
//! Every observable state change is a `rename` or an `unlink`+`symlink`;
//! readers never see a partially-populated version through `current`.

use std::fs;
use std::io::ErrorKind;
use std::os::unix::fs::{symlink, PermissionsExt};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Atomically publish a fully-populated staging directory at its final name.
pub fn publish(staged: &Path, dest: &Path) -> Result<()> {
    debug!(from = %staged.display(), to = %dest.display(), "publishing");
    fs::rename(staged, dest).map_err(|e| {
        Error::AtomicPublishFailed(format!(
            "{} -> {}: {e}",
            staged.display(),
            dest.display()
        ))
    })
}

/// Point the package's `current` link at `version`, replacing any previous
/// target. The link's target is the bare version string.
pub fn repoint_current(link: &Path, version: &str) -> Result<()> {
    match fs::remove_file(link) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::AtomicPublishFailed(format!(
                "cannot unlink {}: {e}",
                link.display()
            )))
        }
    }
    symlink(version, link).map_err(|e| {
        Error::AtomicPublishFailed(format!("cannot link {}: {e}", link.display()))
    })
}

/// Version string the `current` link names, if the link exists.
pub fn read_current(link: &Path) -> Option<String> {
    fs::read_link(link)
        .ok()
        .map(|target| target.to_string_lossy().into_owned())
}

/// Write the launcher script that re-enters the engine's run path, and make
/// it executable.
pub fn write_launcher(bin_dir: &Path, package: &str, binary: &str) -> Result<()> {
    fs::create_dir_all(bin_dir).map_err(|e| {
        Error::PermissionError(format!("cannot create {}: {e}", bin_dir.display()))
    })?;
    let path = bin_dir.join(binary);
    let body = format!("#!/bin/sh\nexec silo run {package} {binary} \"$@\"\n");
    fs::write(&path, body).map_err(|e| {
        Error::PermissionError(format!("cannot write {}: {e}", path.display()))
    })?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).map_err(|e| {
        Error::PermissionError(format!("cannot chmod {}: {e}", path.display()))
    })
}

/// Best-effort launcher removal; a missing script is fine.
pub fn remove_launcher(bin_dir: &Path, binary: &str) {
    let _ = fs::remove_file(bin_dir.join(binary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_publish_renames_staging() {
        let dir = tempdir().unwrap();
        let staged = dir.path().join("1.0.tmp");
        let dest = dir.path().join("1.0");
        fs::create_dir_all(staged.join("sub")).unwrap();
        fs::write(staged.join("sub/file"), "data").unwrap();

        publish(&staged, &dest).unwrap();
        assert!(!staged.exists());
        assert_eq!(fs::read_to_string(dest.join("sub/file")).unwrap(), "data");
    }

    #[test]
    fn test_repoint_current_replaces_target() {
        let dir = tempdir().unwrap();
        let link = dir.path().join("current");
        repoint_current(&link, "1.0").unwrap();
        assert_eq!(read_current(&link).as_deref(), Some("1.0"));
        repoint_current(&link, "1.1").unwrap();
        assert_eq!(read_current(&link).as_deref(), Some("1.1"));
    }

    #[test]
    fn test_read_current_absent_link() {
        let dir = tempdir().unwrap();
        assert_eq!(read_current(&dir.path().join("current")), None);
    }

    #[test]
    fn test_launcher_dispatches_to_engine() {
        let dir = tempdir().unwrap();
        let bin_dir = dir.path().join("bin");
        write_launcher(&bin_dir, "editor", "edit").unwrap();

        let path = bin_dir.join("edit");
        let body = fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("#!/bin/sh"));
        assert!(body.contains("silo run editor edit"));
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);

        remove_launcher(&bin_dir, "edit");
        assert!(!path.exists());
        // Removing again is harmless.
        remove_launcher(&bin_dir, "edit");
    }
}
