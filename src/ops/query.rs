//! Read-only queries: list, info, search, deps
//!
//! None of these take the lock; they read the journal and index, both of
//! which are only ever replaced atomically.

use crate::error::{Error, Result};
use crate::index::PackageIndex;
use crate::journal::Journal;
use crate::paths::Paths;
use crate::resolver;
use crate::store;

use super::PackageSpec;

pub fn list(paths: &Paths) -> Result<()> {
    let journal = Journal::load(&paths.journal_file)?;
    if journal.is_empty() {
        println!("no packages installed");
        return Ok(());
    }
    for (package, versions) in journal.packages() {
        let current = store::read_current(&paths.current_link(package));
        for (version, entry) in versions {
            let mut flags = Vec::new();
            if current.as_deref() == Some(version.as_str()) {
                flags.push("current");
            }
            if entry.pin {
                flags.push("pinned");
            }
            if flags.is_empty() {
                println!("{package} {version}");
            } else {
                println!("{package} {version} ({})", flags.join(", "));
            }
        }
    }
    Ok(())
}

pub fn info(paths: &Paths, package: &str) -> Result<()> {
    let index = PackageIndex::load(&paths.index_file)?;
    let entry = index
        .entry(package)
        .ok_or_else(|| Error::PackageNotFound(package.to_string()))?;

    println!("{package}");
    if !entry.description.is_empty() {
        println!("  {}", entry.description);
    }
    if !entry.author.is_empty() {
        println!("  author:   {}", entry.author);
    }
    if !entry.license.is_empty() {
        println!("  license:  {}", entry.license);
    }
    let versions: Vec<&str> = entry
        .versions
        .iter()
        .map(|record| record.version.as_str())
        .collect();
    println!("  versions: {}", versions.join(", "));
    Ok(())
}

pub fn search(paths: &Paths, query: &str) -> Result<()> {
    let index = PackageIndex::load(&paths.index_file)?;
    let matches = index.search(query);
    if matches.is_empty() {
        println!("no packages match '{query}'");
        return Ok(());
    }
    for (name, entry) in matches {
        if entry.description.is_empty() {
            println!("{name}");
        } else {
            println!("{name} - {}", entry.description);
        }
    }
    Ok(())
}

/// Print the resolved install plan, dependencies first.
pub fn deps(paths: &Paths, spec: &str) -> Result<()> {
    let spec = PackageSpec::parse(spec)?;
    let index = PackageIndex::load(&paths.index_file)?;
    let plan = resolver::resolve(&index, &spec.name, &spec.requirement())?;
    for (package, version) in plan {
        println!("{package} {version}");
    }
    Ok(())
}
