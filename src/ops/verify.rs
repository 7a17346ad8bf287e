//! Verify operation
//!
//! Checks the published version of a package against its journal entry.
//! When the cached archive is still around, its digest is recomputed and
//! compared with the one the artifact was accepted with; when the cache has
//! been pruned (always allowed), the store tree itself is checked: the
//! directory must hold a manifest agreeing with the journal.

use crate::error::{Error, Result};
use crate::hash;
use crate::journal::{Journal, DIGEST_NONE};
use crate::manifest::Manifest;
use crate::paths::Paths;
use crate::store;

pub fn verify(paths: &Paths, package: &str) -> Result<()> {
    let journal = Journal::load(&paths.journal_file)?;
    if journal.installed_versions(package).is_empty() {
        return Err(Error::PackageNotInstalled(package.to_string()));
    }
    let version = store::read_current(&paths.current_link(package)).ok_or_else(|| {
        Error::VerificationFailed(format!("'{package}' has no published version"))
    })?;
    let entry = journal.entry(package, &version).ok_or_else(|| {
        Error::VerificationFailed(format!(
            "published version {version} of '{package}' is not recorded"
        ))
    })?;

    let version_dir = paths.version_dir(package, &version);
    let manifest = Manifest::load(&version_dir).map_err(|e| {
        Error::VerificationFailed(format!("store tree for {package} {version}: {e}"))
    })?;
    if manifest.name != package || manifest.version != version {
        return Err(Error::VerificationFailed(format!(
            "manifest declares {} {}, journal records {package} {version}",
            manifest.name, manifest.version
        )));
    }

    let archive = paths.cached_archive(package, &version);
    if entry.digest != DIGEST_NONE && archive.exists() {
        let actual = hash::sha256_file(&archive).map_err(|e| {
            Error::VerificationFailed(format!("cannot read {}: {e}", archive.display()))
        })?;
        if actual != entry.digest {
            return Err(Error::VerificationFailed(format!(
                "archive digest {actual} does not match recorded {}",
                entry.digest
            )));
        }
    }

    println!("{package} {version} verified");
    Ok(())
}
