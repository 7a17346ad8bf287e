//! Self-upgrade of the engine and its sandbox helper
//!
//! Compares the remote release version against the local version record
//! (falling back to the built-in version), then replaces both binaries via
//! staged downloads and renames. Independent of the package lock: upgrading
//! the engine touches neither the store nor the journal.

use std::cmp::Ordering;
use std::fs;
use std::os::unix::fs::PermissionsExt;

use tracing::info;

use crate::error::{Error, Result};
use crate::paths::Paths;
use crate::ui;
use crate::version;

const ENGINE_BINARIES: [&str; 2] = ["silo", "silo-sandbox"];

pub fn upgrade(paths: &Paths) -> Result<()> {
    let local = fs::read_to_string(&paths.version_file)
        .map(|content| content.trim().to_string())
        .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    fs::create_dir_all(&paths.cache_root)
        .map_err(|e| Error::Download(format!("cannot create cache directory: {e}")))?;
    let staged_version = paths.cache_root.join("engine-version");
    super::download(&format!("{}/VERSION", paths.release_url), &staged_version)?;
    let remote = fs::read_to_string(&staged_version)
        .map_err(|e| Error::Download(e.to_string()))?
        .trim()
        .to_string();
    let _ = fs::remove_file(&staged_version);

    if version::compare(&remote, &local) != Ordering::Greater {
        println!("engine {local} is current");
        return Ok(());
    }
    info!(%local, %remote, "upgrading engine");

    fs::create_dir_all(&paths.bin_dir).map_err(|e| {
        Error::PermissionError(format!("cannot create {}: {e}", paths.bin_dir.display()))
    })?;
    for binary in ENGINE_BINARIES {
        let staged = paths.bin_dir.join(format!("{binary}.tmp"));
        let dest = paths.bin_dir.join(binary);

        let spinner = ui::phase_spinner(format!("downloading {binary} {remote}"));
        let fetched = super::download(&format!("{}/{binary}", paths.release_url), &staged);
        spinner.finish_and_clear();
        fetched?;

        fs::set_permissions(&staged, fs::Permissions::from_mode(0o755)).map_err(|e| {
            Error::PermissionError(format!("cannot chmod {}: {e}", staged.display()))
        })?;
        fs::rename(&staged, &dest).map_err(|e| {
            Error::AtomicPublishFailed(format!("{} -> {}: {e}", staged.display(), dest.display()))
        })?;
    }

    if let Some(parent) = paths.version_file.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            Error::PermissionError(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    fs::write(&paths.version_file, format!("{remote}\n")).map_err(|e| {
        Error::PermissionError(format!(
            "cannot write {}: {e}",
            paths.version_file.display()
        ))
    })?;

    println!("engine upgraded {local} -> {remote}");
    Ok(())
}
