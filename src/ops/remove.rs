//! Remove operation
//!
//! Targets one recorded version or every recorded version of a package.
//! Launcher scripts are dropped only when no other installed version still
//! declares the binary; the `current` link goes when its target does.

use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::lock::Lock;
use crate::manifest::Manifest;
use crate::paths::Paths;
use crate::store;

use super::PackageSpec;

pub fn remove(paths: &Paths, spec: &str, assume_yes: bool) -> Result<()> {
    let spec = PackageSpec::parse(spec)?;

    let _lock = Lock::acquire(&paths.lock_file)?;
    let mut journal = Journal::load(&paths.journal_file)?;

    if journal.installed_versions(&spec.name).is_empty() {
        return Err(Error::PackageNotInstalled(spec.name));
    }
    let targets: Vec<String> = match &spec.version {
        Some(version) => {
            if journal.entry(&spec.name, version).is_none() {
                return Err(Error::VersionNotFound {
                    package: spec.name.clone(),
                    version: version.clone(),
                });
            }
            vec![version.clone()]
        }
        None => journal.installed_versions(&spec.name),
    };

    if !assume_yes && !confirm(&spec.name, &targets)? {
        println!("aborted");
        return Ok(());
    }

    let result = (|| {
        for version in &targets {
            remove_version(paths, &mut journal, &spec.name, version)?;
        }
        Ok(())
    })();
    journal.save_atomic(&paths.journal_file)?;
    result?;

    println!("removed {} ({})", spec.name, targets.join(", "));
    Ok(())
}

/// Prompt on a terminal; non-interactive invocations proceed without asking.
fn confirm(package: &str, versions: &[String]) -> Result<bool> {
    if !io::stdin().is_terminal() {
        return Ok(true);
    }
    print!("remove {package} {}? [y/N] ", versions.join(", "));
    io::stdout().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| Error::InvalidArguments(e.to_string()))?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

/// Remove one installed version: launchers no other version still declares,
/// the artifact directory, the `current` link if it pointed here, the
/// journal entry, and the package's store directory once empty. The caller
/// holds the lock and saves the journal.
pub(crate) fn remove_version(
    paths: &Paths,
    journal: &mut Journal,
    package: &str,
    version: &str,
) -> Result<()> {
    let version_dir = paths.version_dir(package, version);

    if let Ok(manifest) = Manifest::load(&version_dir) {
        let siblings: Vec<String> = journal
            .installed_versions(package)
            .into_iter()
            .filter(|recorded| recorded != version)
            .collect();
        let mut still_declared: HashSet<String> = HashSet::new();
        for sibling in &siblings {
            if let Ok(other) = Manifest::load(&paths.version_dir(package, sibling)) {
                still_declared.extend(other.bins);
            }
        }
        for binary in &manifest.bins {
            if !still_declared.contains(binary) {
                store::remove_launcher(&paths.bin_dir, binary);
            }
        }
    }

    if version_dir.exists() {
        fs::remove_dir_all(&version_dir).map_err(|e| {
            Error::PermissionError(format!("cannot remove {}: {e}", version_dir.display()))
        })?;
    }

    let link = paths.current_link(package);
    if store::read_current(&link).as_deref() == Some(version) {
        let _ = fs::remove_file(&link);
    }

    journal.forget(package, version);
    if journal.installed_versions(package).is_empty() {
        let _ = fs::remove_dir_all(paths.package_dir(package));
    }
    Ok(())
}
