//! Package index: the cached copy of the remote catalogue
//!
//! A JSON document mapping package name to an entry with author, license,
//! description, and an ordered list of version records. The index is
//! read-only during operations and replaced wholesale by `refresh`.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::{self, Requirement};

/// One published artifact of a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version: String,
    /// Download location of the archive.
    pub url: String,
    /// Lowercase hex SHA-256 of the archive; absent when the publisher did
    /// not provide one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    /// Dependency constraints: package name to requirement string.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub deps: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageEntry {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub description: String,
    pub versions: Vec<VersionRecord>,
}

impl PackageEntry {
    /// Highest version under the segment-wise order.
    pub fn latest(&self) -> Option<&VersionRecord> {
        self.versions
            .iter()
            .max_by(|a, b| version::compare(&a.version, &b.version))
    }

    /// Highest version satisfying `requirement`.
    pub fn best_match(&self, requirement: &Requirement) -> Option<&VersionRecord> {
        self.versions
            .iter()
            .filter(|record| requirement.matches(&record.version))
            .max_by(|a, b| version::compare(&a.version, &b.version))
    }

    pub fn find_version(&self, version: &str) -> Option<&VersionRecord> {
        self.versions.iter().find(|record| record.version == version)
    }
}

/// The whole catalogue, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageIndex {
    packages: IndexMap<String, PackageEntry>,
}

impl PackageIndex {
    pub fn load(path: &Path) -> Result<PackageIndex> {
        if !path.exists() {
            return Err(Error::IndexLoad(
                "no cached index; run 'silo refresh' first".to_string(),
            ));
        }
        let data =
            fs::read_to_string(path).map_err(|e| Error::IndexLoad(e.to_string()))?;
        PackageIndex::parse(&data)
    }

    pub fn parse(data: &str) -> Result<PackageIndex> {
        let index: PackageIndex =
            serde_json::from_str(data).map_err(|e| Error::IndexLoad(e.to_string()))?;
        index.validate()?;
        Ok(index)
    }

    /// Version strings must be unique within each entry.
    fn validate(&self) -> Result<()> {
        for (name, entry) in &self.packages {
            let mut seen = HashSet::new();
            for record in &entry.versions {
                if !seen.insert(record.version.as_str()) {
                    return Err(Error::IndexLoad(format!(
                        "duplicate version '{}' for package '{}'",
                        record.version, name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn entry(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.get(name)
    }

    pub fn find_version(&self, name: &str, version: &str) -> Option<&VersionRecord> {
        self.entry(name)?.find_version(version)
    }

    pub fn latest(&self, name: &str) -> Option<&VersionRecord> {
        self.entry(name)?.latest()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Case-insensitive substring match on name or description.
    pub fn search(&self, query: &str) -> Vec<(&String, &PackageEntry)> {
        let needle = query.to_lowercase();
        self.packages
            .iter()
            .filter(|(name, entry)| {
                name.to_lowercase().contains(&needle)
                    || entry.description.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
