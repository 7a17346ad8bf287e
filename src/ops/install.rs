//! Install operation
//!
//! Resolves the plan, then walks it dependency-first: fetch (or reuse the
//! cached archive), verify, extract into a staging sibling, run the
//! manifest's install commands in the sandbox, publish atomically, repoint
//! `current`, write launchers, record in the journal. A failure leaves at
//! most a staging directory behind; the next install of that version clears
//! it.

use std::fs;

use chrono::Utc;
use tracing::debug;

use crate::error::{Error, Result};
use crate::exec;
use crate::hash;
use crate::index::PackageIndex;
use crate::journal::{Journal, DIGEST_NONE};
use crate::lock::Lock;
use crate::manifest::Manifest;
use crate::paths::Paths;
use crate::resolver;
use crate::sandbox;
use crate::store;
use crate::ui;

use super::PackageSpec;

pub fn install(paths: &Paths, specs: &[String]) -> Result<()> {
    let parsed: Vec<PackageSpec> = specs
        .iter()
        .map(|spec| PackageSpec::parse(spec))
        .collect::<Result<_>>()?;

    let _lock = Lock::acquire(&paths.lock_file)?;
    let index = PackageIndex::load(&paths.index_file)?;
    let mut journal = Journal::load(&paths.journal_file)?;

    let roots: Vec<(String, String)> = parsed
        .iter()
        .map(|spec| (spec.name.clone(), spec.requirement()))
        .collect();
    let plan = resolver::resolve_many(&index, &roots)?;
    debug!(?plan, "resolved install plan");

    let result = (|| {
        for (package, version) in &plan {
            install_step(paths, &index, &mut journal, package, version)?;
        }
        Ok(())
    })();
    // Record whatever completed, even when a later plan entry failed; each
    // published version must be in the journal once the lock is released.
    journal.save_atomic(&paths.journal_file)?;
    result
}

/// Install one plan entry. The caller holds the lock and saves the journal.
pub(crate) fn install_step(
    paths: &Paths,
    index: &PackageIndex,
    journal: &mut Journal,
    package: &str,
    version: &str,
) -> Result<()> {
    if journal.entry(package, version).is_some()
        && paths.version_dir(package, version).exists()
    {
        println!("{package} {version} already installed");
        return Ok(());
    }

    let record = index
        .find_version(package, version)
        .ok_or_else(|| Error::VersionNotFound {
            package: package.to_string(),
            version: version.to_string(),
        })?
        .clone();

    fs::create_dir_all(&paths.cache_root)
        .map_err(|e| Error::Download(format!("cannot create cache directory: {e}")))?;
    let archive = paths.cached_archive(package, version);
    if !archive.exists() {
        let spinner = ui::phase_spinner(format!("downloading {package} {version}"));
        let fetched = super::download(&record.url, &archive);
        spinner.finish_and_clear();
        fetched?;
    } else {
        debug!(archive = %archive.display(), "reusing cached archive");
    }

    if let Some(expected) = &record.sha256 {
        if let Err(err) = hash::verify_file(&archive, expected) {
            // A corrupt cache entry is deleted before the error surfaces, so
            // the next attempt downloads afresh.
            let _ = fs::remove_file(&archive);
            return Err(err);
        }
    }

    let staging = paths.staging_dir(package, version);
    if staging.exists() {
        debug!(path = %staging.display(), "clearing stale staging directory");
        fs::remove_dir_all(&staging)
            .map_err(|e| Error::ExtractionFailed(format!("cannot clear staging: {e}")))?;
    }
    fs::create_dir_all(&staging).map_err(|e| {
        Error::ExtractionFailed(format!("cannot create {}: {e}", staging.display()))
    })?;

    let spinner = ui::phase_spinner(format!("unpacking {package} {version}"));
    let extracted = extract(&archive, &staging);
    spinner.finish_and_clear();
    extracted?;

    let manifest = Manifest::load(&staging)?;

    let spinner = ui::phase_spinner(format!("installing {package} {version}"));
    let installed = sandbox::run_install(&paths.sandbox_helper, &staging, &manifest);
    spinner.finish_and_clear();
    installed?;

    store::publish(&staging, &paths.version_dir(package, version))?;
    store::repoint_current(&paths.current_link(package), version)?;
    for binary in &manifest.bins {
        store::write_launcher(&paths.bin_dir, package, binary)?;
    }

    let digest = record.sha256.as_deref().unwrap_or(DIGEST_NONE);
    journal.record(package, version, digest, Utc::now().timestamp());
    println!("installed {package} {version}");
    Ok(())
}

/// Unpack an archive through the external extractor.
fn extract(archive: &std::path::Path, dest: &std::path::Path) -> Result<()> {
    let archive_path = archive.display().to_string();
    let dest_path = dest.display().to_string();
    let argv = exec::argv(["tar", "-xzf", archive_path.as_str(), "-C", dest_path.as_str()]);
    match exec::status(&argv) {
        Ok(0) => Ok(()),
        Ok(code) => Err(Error::ExtractionFailed(format!(
            "tar exited with status {code}"
        ))),
        Err(e) => Err(Error::ExtractionFailed(e.to_string())),
    }
}
