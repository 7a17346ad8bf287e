//! Process-wide mutual exclusion via a pid lock file
//!
//! Exactly one mutating operation runs per host. The lock file holds the
//! holder's decimal pid; an absent file or a dead holder means the lock is
//! free. Release happens on drop so every exit path is covered, including
//! failures. A process killed mid-operation leaves the file behind and the
//! next acquisition reclaims it through the liveness probe.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::sys::signal::kill;
use nix::unistd::Pid;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct Lock {
    path: PathBuf,
}

impl Lock {
    /// Acquire the lock, reclaiming it from a dead holder if necessary.
    pub fn acquire(path: &Path) -> Result<Lock> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::PermissionError(format!("cannot create {}: {e}", parent.display()))
            })?;
        }
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    write!(file, "{}", std::process::id()).map_err(|e| {
                        Error::PermissionError(format!("cannot write lock file: {e}"))
                    })?;
                    return Ok(Lock {
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                    let holder = fs::read_to_string(path)
                        .ok()
                        .and_then(|content| content.trim().parse::<i32>().ok());
                    match holder {
                        Some(pid) if alive(pid) => return Err(Error::LockHeld(pid)),
                        _ => {
                            // Dead holder or garbage content: reclaim.
                            debug!(path = %path.display(), "reclaiming stale lock");
                            if let Err(e) = fs::remove_file(path) {
                                if e.kind() != ErrorKind::NotFound {
                                    return Err(Error::PermissionError(format!(
                                        "cannot remove stale lock: {e}"
                                    )));
                                }
                            }
                        }
                    }
                }
                Err(err) => {
                    return Err(Error::PermissionError(format!(
                        "cannot create lock file: {err}"
                    )))
                }
            }
        }
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Zero-signal delivery probe. `ESRCH` means the pid is gone; `EPERM` means
/// it exists under another user and therefore counts as alive.
fn alive(pid: i32) -> bool {
    match kill(Pid::from_raw(pid), None) {
        Ok(()) => true,
        Err(Errno::ESRCH) => false,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Far above any real pid_max, so the liveness probe reports it dead.
    const DEAD_PID: i32 = 999_999_999;

    #[test]
    fn test_acquire_writes_own_pid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lock");
        let _lock = Lock::acquire(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }

    #[test]
    fn test_live_holder_blocks_acquisition() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lock");
        let _lock = Lock::acquire(&path).unwrap();
        // Our own pid is alive, so a second acquisition fails.
        let err = Lock::acquire(&path).unwrap_err();
        assert!(matches!(err, Error::LockHeld(_)));
    }

    #[test]
    fn test_stale_lock_is_reclaimed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lock");
        fs::write(&path, DEAD_PID.to_string()).unwrap();
        let _lock = Lock::acquire(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }

    #[test]
    fn test_garbage_content_is_reclaimed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lock");
        fs::write(&path, "not a pid").unwrap();
        assert!(Lock::acquire(&path).is_ok());
    }

    #[test]
    fn test_drop_releases() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lock");
        {
            let _lock = Lock::acquire(&path).unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
        assert!(Lock::acquire(&path).is_ok());
    }
}
