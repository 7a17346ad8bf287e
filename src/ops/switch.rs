//! Switch and pin operations
//!
//! `switch` is the only command that repoints `current` outside of install
//! and remove; `pin` and `unpin` toggle the journal's update-suppression
//! flag.

use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::lock::Lock;
use crate::paths::Paths;
use crate::store;

pub fn switch(paths: &Paths, package: &str, version: &str) -> Result<()> {
    let _lock = Lock::acquire(&paths.lock_file)?;
    let journal = Journal::load(&paths.journal_file)?;

    if journal.installed_versions(package).is_empty() {
        return Err(Error::PackageNotInstalled(package.to_string()));
    }
    if journal.entry(package, version).is_none() {
        return Err(Error::VersionNotFound {
            package: package.to_string(),
            version: version.to_string(),
        });
    }
    store::repoint_current(&paths.current_link(package), version)?;
    println!("{package} current -> {version}");
    Ok(())
}

pub fn pin(paths: &Paths, package: &str, version: &str) -> Result<()> {
    let _lock = Lock::acquire(&paths.lock_file)?;
    let mut journal = Journal::load(&paths.journal_file)?;
    journal.set_pin(package, version, true)?;
    journal.save_atomic(&paths.journal_file)?;
    println!("pinned {package} {version}");
    Ok(())
}

/// Clears the pin on the currently published version.
pub fn unpin(paths: &Paths, package: &str) -> Result<()> {
    let _lock = Lock::acquire(&paths.lock_file)?;
    let mut journal = Journal::load(&paths.journal_file)?;
    let current = store::read_current(&paths.current_link(package))
        .ok_or_else(|| Error::PackageNotInstalled(package.to_string()))?;
    journal.set_pin(package, &current, false)?;
    journal.save_atomic(&paths.journal_file)?;
    println!("unpinned {package} {current}");
    Ok(())
}
