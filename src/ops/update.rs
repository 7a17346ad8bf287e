//! Update operation and the read-only outdated report
//!
//! For each journaled package, the index maximum is compared against the
//! published version; a strictly newer, unpinned package is removed and
//! reinstalled inside the same lock.

use std::cmp::Ordering;

use crate::error::Result;
use crate::index::PackageIndex;
use crate::journal::Journal;
use crate::lock::Lock;
use crate::paths::Paths;
use crate::resolver;
use crate::store;
use crate::version;

use super::{install, remove};

pub fn update(paths: &Paths) -> Result<()> {
    let _lock = Lock::acquire(&paths.lock_file)?;
    let index = PackageIndex::load(&paths.index_file)?;
    let mut journal = Journal::load(&paths.journal_file)?;

    let mut updated = 0usize;
    let mut unchanged = 0usize;
    let packages = journal.package_names();

    let result = (|| {
        for package in &packages {
            let Some(current) = store::read_current(&paths.current_link(package)) else {
                unchanged += 1;
                continue;
            };
            let Some(best) = index.latest(package).map(|r| r.version.clone()) else {
                unchanged += 1;
                continue;
            };
            let pinned = journal
                .entry(package, &current)
                .map(|entry| entry.pin)
                .unwrap_or(false);
            if pinned || version::compare(&best, &current) != Ordering::Greater {
                unchanged += 1;
                continue;
            }
            remove::remove_version(paths, &mut journal, package, &current)?;
            for (dep, dep_version) in resolver::resolve(&index, package, &format!("={best}"))? {
                install::install_step(paths, &index, &mut journal, &dep, &dep_version)?;
            }
            updated += 1;
        }
        Ok(())
    })();
    journal.save_atomic(&paths.journal_file)?;
    result?;

    println!("updated {updated}, current {unchanged}");
    Ok(())
}

/// Read-only diff of published versions against index maxima.
pub fn outdated(paths: &Paths) -> Result<()> {
    let index = PackageIndex::load(&paths.index_file)?;
    let journal = Journal::load(&paths.journal_file)?;

    let mut any = false;
    for package in journal.package_names() {
        let Some(current) = store::read_current(&paths.current_link(&package)) else {
            continue;
        };
        let Some(best) = index.latest(&package) else {
            continue;
        };
        if version::compare(&best.version, &current) == Ordering::Greater {
            println!("{package} {current} -> {}", best.version);
            any = true;
        }
    }
    if !any {
        println!("all packages are current");
    }
    Ok(())
}
