//! Index refresh
//!
//! Downloads the catalogue to a staging file, parses it, and only then
//! renames it over the cache; a corrupt fetch never replaces a good index.

use std::fs;

use tracing::info;

use crate::error::{Error, Result};
use crate::index::PackageIndex;
use crate::paths::Paths;
use crate::ui;

pub fn refresh(paths: &Paths, url: Option<&str>) -> Result<()> {
    let url = url.unwrap_or(&paths.index_url);
    if let Some(parent) = paths.index_file.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IndexLoad(e.to_string()))?;
    }
    let staged = paths.index_file.with_extension("json.tmp");

    let spinner = ui::phase_spinner(format!("fetching index from {url}"));
    let fetched = super::download(url, &staged).map_err(|e| Error::IndexLoad(e.to_string()));
    spinner.finish_and_clear();
    fetched?;

    let data = fs::read_to_string(&staged).map_err(|e| Error::IndexLoad(e.to_string()))?;
    let index = match PackageIndex::parse(&data) {
        Ok(index) => index,
        Err(err) => {
            let _ = fs::remove_file(&staged);
            return Err(err);
        }
    };
    fs::rename(&staged, &paths.index_file)
        .map_err(|e| Error::AtomicPublishFailed(e.to_string()))?;

    info!(packages = index.len(), "index refreshed");
    println!("index refreshed ({} packages)", index.len());
    Ok(())
}
