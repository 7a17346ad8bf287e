//! State journal: the durable record of installed versions
//!
//! A JSON document mapping package name to a map of version to entry. The
//! journal is loaded and saved inside each operation's locked region; it is
//! never cached across operations. Saves go through a temp file and rename
//! so readers never observe a torn document.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Recorded digest when the index published none for the artifact.
pub const DIGEST_NONE: &str = "none";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstalledEntry {
    /// Digest the artifact was accepted with, or [`DIGEST_NONE`].
    pub digest: String,
    /// Install time, Unix seconds.
    pub timestamp: i64,
    /// Suppresses automatic update of this version.
    pub pin: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Journal {
    packages: IndexMap<String, IndexMap<String, InstalledEntry>>,
}

impl Journal {
    /// An absent or empty file is an empty journal.
    pub fn load(path: &Path) -> Result<Journal> {
        if !path.exists() {
            return Ok(Journal::default());
        }
        let data =
            fs::read_to_string(path).map_err(|e| Error::JournalLoad(e.to_string()))?;
        if data.trim().is_empty() {
            return Ok(Journal::default());
        }
        serde_json::from_str(&data).map_err(|e| Error::JournalLoad(e.to_string()))
    }

    /// Serialize to a sibling temp file, then rename over the journal.
    pub fn save_atomic(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::AtomicPublishFailed(e.to_string()))?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|e| Error::AtomicPublishFailed(e.to_string()))?;
        let staged = path.with_file_name(match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => format!("{name}.tmp"),
            None => "state.tmp".to_string(),
        });
        fs::write(&staged, data).map_err(|e| Error::AtomicPublishFailed(e.to_string()))?;
        fs::rename(&staged, path).map_err(|e| Error::AtomicPublishFailed(e.to_string()))
    }

    pub fn record(&mut self, package: &str, version: &str, digest: &str, timestamp: i64) {
        self.packages
            .entry(package.to_string())
            .or_insert_with(IndexMap::new)
            .insert(
                version.to_string(),
                InstalledEntry {
                    digest: digest.to_string(),
                    timestamp,
                    pin: false,
                },
            );
    }

    /// Drop a version; the package key goes with its last version.
    pub fn forget(&mut self, package: &str, version: &str) {
        if let Some(versions) = self.packages.get_mut(package) {
            versions.shift_remove(version);
            if versions.is_empty() {
                self.packages.shift_remove(package);
            }
        }
    }

    pub fn set_pin(&mut self, package: &str, version: &str, pin: bool) -> Result<()> {
        let versions = self
            .packages
            .get_mut(package)
            .ok_or_else(|| Error::PackageNotInstalled(package.to_string()))?;
        let entry = versions.get_mut(version).ok_or_else(|| Error::VersionNotFound {
            package: package.to_string(),
            version: version.to_string(),
        })?;
        entry.pin = pin;
        Ok(())
    }

    pub fn entry(&self, package: &str, version: &str) -> Option<&InstalledEntry> {
        self.packages.get(package)?.get(version)
    }

    pub fn installed_versions(&self, package: &str) -> Vec<String> {
        self.packages
            .get(package)
            .map(|versions| versions.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn package_names(&self) -> Vec<String> {
        self.packages.keys().cloned().collect()
    }

    pub fn packages(
        &self,
    ) -> impl Iterator<Item = (&String, &IndexMap<String, InstalledEntry>)> {
        self.packages.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut journal = Journal::default();
        journal.record("foo", "1.0", "abc123", 1700000000);
        journal.record("foo", "1.1", DIGEST_NONE, 1700000100);
        journal.save_atomic(&path).unwrap();

        let loaded = Journal::load(&path).unwrap();
        assert_eq!(loaded.installed_versions("foo"), vec!["1.0", "1.1"]);
        assert_eq!(loaded.entry("foo", "1.0").unwrap().digest, "abc123");
        assert!(!loaded.entry("foo", "1.1").unwrap().pin);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        Journal::default().save_atomic(&path).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("state.json.tmp").exists());
    }

    #[test]
    fn test_absent_and_empty_files_are_empty_journals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        assert!(Journal::load(&path).unwrap().is_empty());
        std::fs::write(&path, "  \n").unwrap();
        assert!(Journal::load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_journal_load_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Journal::load(&path).unwrap_err(),
            Error::JournalLoad(_)
        ));
    }

    #[test]
    fn test_forget_drops_empty_package() {
        let mut journal = Journal::default();
        journal.record("foo", "1.0", "abc", 0);
        journal.record("foo", "1.1", "def", 0);
        journal.forget("foo", "1.0");
        assert_eq!(journal.installed_versions("foo"), vec!["1.1"]);
        journal.forget("foo", "1.1");
        assert!(journal.is_empty());
        assert!(journal.package_names().is_empty());
    }

    #[test]
    fn test_set_pin_requires_recorded_version() {
        let mut journal = Journal::default();
        journal.record("foo", "1.0", "abc", 0);
        journal.set_pin("foo", "1.0", true).unwrap();
        assert!(journal.entry("foo", "1.0").unwrap().pin);
        assert!(matches!(
            journal.set_pin("foo", "2.0", true).unwrap_err(),
            Error::VersionNotFound { .. }
        ));
        assert!(matches!(
            journal.set_pin("bar", "1.0", true).unwrap_err(),
            Error::PackageNotInstalled(_)
        ));
    }
}
