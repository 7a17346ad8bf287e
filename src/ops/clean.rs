//! Clean operation
//!
//! Deletes cached archives and any staging directories left behind by
//! interrupted installs. The cache is reconstructible at any time; staging
//! directories are store state, so the lock is held while they go.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::lock::Lock;
use crate::paths::Paths;

pub fn clean(paths: &Paths) -> Result<()> {
    let _lock = Lock::acquire(&paths.lock_file)?;

    let mut removed = 0usize;
    let mut bytes = 0u64;

    if paths.cache_root.exists() {
        for entry in read_dir(&paths.cache_root)? {
            let path = entry.path();
            if path.is_file() {
                bytes += entry.metadata().map(|m| m.len()).unwrap_or(0);
                fs::remove_file(&path).map_err(|e| {
                    Error::PermissionError(format!("cannot remove {}: {e}", path.display()))
                })?;
                removed += 1;
            }
        }
    }

    if paths.store_root.exists() {
        for package in read_dir(&paths.store_root)? {
            if !package.path().is_dir() {
                continue;
            }
            for child in read_dir(&package.path())? {
                let path = child.path();
                let stale = path.is_dir()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.ends_with(".tmp"));
                if stale {
                    fs::remove_dir_all(&path).map_err(|e| {
                        Error::PermissionError(format!(
                            "cannot remove {}: {e}",
                            path.display()
                        ))
                    })?;
                    removed += 1;
                }
            }
        }
    }

    println!("removed {removed} cached items ({bytes} bytes)");
    Ok(())
}

fn read_dir(dir: &Path) -> Result<Vec<fs::DirEntry>> {
    fs::read_dir(dir)
        .and_then(|entries| entries.collect())
        .map_err(|e| Error::PermissionError(format!("cannot read {}: {e}", dir.display())))
}
