//! Build operation
//!
//! Packs the working directory's conventional inputs (the manifest, the
//! `bin/` launcher tree, the `files/` payload tree) into `<name>.archive`
//! through the external archiver. The manifest must parse before anything
//! is packed.

use std::env;

use crate::error::{Error, Result};
use crate::exec;
use crate::manifest::{Manifest, MANIFEST_FILE};

const INPUTS: [&str; 3] = [MANIFEST_FILE, "bin", "files"];

pub fn build(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidArguments(format!(
            "bad archive name '{name}'"
        )));
    }
    let cwd = env::current_dir().map_err(|e| Error::InvalidArguments(e.to_string()))?;
    for input in INPUTS {
        if !cwd.join(input).exists() {
            return Err(Error::InvalidArguments(format!(
                "missing '{input}' in working directory"
            )));
        }
    }
    let manifest = Manifest::load(&cwd)?;

    let output = format!("{name}.archive");
    let argv = exec::argv(["tar", "-czf", output.as_str(), MANIFEST_FILE, "bin", "files"]);
    match exec::status(&argv) {
        Ok(0) => {
            println!("built {output} ({} {})", manifest.name, manifest.version);
            Ok(())
        }
        Ok(code) => Err(Error::ExtractionFailed(format!(
            "tar exited with status {code}"
        ))),
        Err(e) => Err(Error::ExtractionFailed(e.to_string())),
    }
}
