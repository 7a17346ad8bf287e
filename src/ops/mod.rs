//! Lifecycle operations
//!
//! Every mutating operation acquires the lock on entry, loads the index and
//! journal fresh, and saves the journal before the lock guard drops. Readers
//! (`search`, `info`, `list`, `outdated`, `deps`) never take the lock; the
//! journal and `current` links are updated atomically, so the worst they see
//! is a leftover staging directory.

pub mod build;
pub mod clean;
pub mod install;
pub mod query;
pub mod refresh;
pub mod remove;
pub mod run;
pub mod switch;
pub mod update;
pub mod upgrade;
pub mod verify;

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::exec;

/// A command-line package spec: `<name>` or `<name>=<version>`.
#[derive(Debug, Clone)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    pub fn parse(spec: &str) -> Result<PackageSpec> {
        if let Some((name, version)) = spec.split_once('=') {
            if name.is_empty() || version.is_empty() {
                return Err(Error::InvalidArguments(format!(
                    "bad package spec '{spec}'"
                )));
            }
            Ok(PackageSpec {
                name: name.to_string(),
                version: Some(version.to_string()),
            })
        } else if spec.is_empty() {
            Err(Error::InvalidArguments("empty package spec".to_string()))
        } else {
            Ok(PackageSpec {
                name: spec.to_string(),
                version: None,
            })
        }
    }

    /// Requirement string this spec implies for the resolver.
    pub fn requirement(&self) -> String {
        match &self.version {
            Some(version) => format!("={version}"),
            None => String::new(),
        }
    }
}

/// Fetch a URL to a destination file through the external downloader.
///
/// A failed download never leaves a partial file behind.
pub(crate) fn download(url: &str, dest: &Path) -> Result<()> {
    let dest_path = dest.display().to_string();
    let argv = exec::argv(["curl", "-fsSL", "--output", dest_path.as_str(), url]);
    match exec::status(&argv) {
        Ok(0) => Ok(()),
        Ok(code) => {
            let _ = fs::remove_file(dest);
            Err(Error::Download(format!("'{url}' (curl exit {code})")))
        }
        Err(e) => {
            let _ = fs::remove_file(dest);
            Err(Error::Download(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_without_version() {
        let spec = PackageSpec::parse("foo").unwrap();
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.version, None);
        assert_eq!(spec.requirement(), "");
    }

    #[test]
    fn test_spec_with_version() {
        let spec = PackageSpec::parse("foo=1.0").unwrap();
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.version.as_deref(), Some("1.0"));
        assert_eq!(spec.requirement(), "=1.0");
    }

    #[test]
    fn test_bad_specs_rejected() {
        assert!(PackageSpec::parse("").is_err());
        assert!(PackageSpec::parse("=1.0").is_err());
        assert!(PackageSpec::parse("foo=").is_err());
    }
}
