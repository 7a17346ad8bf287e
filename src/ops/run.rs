//! Run a managed binary under the sandbox
//!
//! Resolves the store directory from an explicit version or the `current`
//! link, checks the binary is declared, and propagates the sandboxed exit
//! status. Running never repoints `current`; `switch` is the only mechanism
//! for that.

use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::manifest::Manifest;
use crate::paths::Paths;
use crate::sandbox;
use crate::store;

use super::PackageSpec;

pub fn run(paths: &Paths, spec: &str, binary: &str, args: &[String]) -> Result<i32> {
    let spec = PackageSpec::parse(spec)?;
    let journal = Journal::load(&paths.journal_file)?;

    if journal.installed_versions(&spec.name).is_empty() {
        return Err(Error::PackageNotInstalled(spec.name));
    }
    let version = match &spec.version {
        Some(version) => {
            if journal.entry(&spec.name, version).is_none() {
                return Err(Error::VersionNotFound {
                    package: spec.name.clone(),
                    version: version.clone(),
                });
            }
            version.clone()
        }
        None => store::read_current(&paths.current_link(&spec.name)).ok_or_else(|| {
            Error::VersionNotFound {
                package: spec.name.clone(),
                version: "current".to_string(),
            }
        })?,
    };

    let version_dir = paths.version_dir(&spec.name, &version);
    let manifest = Manifest::load(&version_dir)?;
    if !manifest.bins.iter().any(|declared| declared == binary) {
        return Err(Error::InvalidArguments(format!(
            "'{}' does not declare binary '{binary}'",
            spec.name
        )));
    }
    sandbox::run_binary(&paths.sandbox_helper, &version_dir, &manifest, binary, args)
}
