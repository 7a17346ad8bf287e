//! Package manifest: `manifest.silo` at the artifact root
//!
//! Line-oriented text with two marker forms: `@section` opens one of the
//! five sections, and `key = value` lines attach to the most recent one.
//! Repeated keys (`bin`, `path`, `run`) accumulate into lists; inside
//! `@specs`, keys prefixed `dep.` form the dependency map and everything
//! else is an opaque system spec. Blank lines and `#` comments are ignored.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// File name of the manifest inside every artifact.
pub const MANIFEST_FILE: &str = "manifest.silo";

/// Namespace bindings and shares requested by a package, applied on top of
/// the engine's fixed default policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SandboxProfile {
    /// Share the host network namespace.
    pub network: bool,
    /// Bind the host graphics socket directory, share IPC, propagate DISPLAY.
    pub graphical: bool,
    /// Bind the host device tree.
    pub device: bool,
    /// Extra host paths bound read-write at the same absolute path.
    pub extra_paths: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub authors: String,
    pub license: String,
    pub summary: String,
    pub long: String,
    /// Launcher binary names to publish.
    pub bins: Vec<String>,
    pub system_specs: IndexMap<String, String>,
    /// Package name to requirement string.
    pub deps: IndexMap<String, String>,
    pub sandbox: SandboxProfile,
    /// Executed in order, joined with `&&`, under `sh -c` in the sandbox.
    pub install_commands: Vec<String>,
}

#[derive(Clone, Copy)]
enum Section {
    Metadata,
    Description,
    Specs,
    Sandbox,
    Install,
}

impl Manifest {
    /// Load and parse the manifest from an artifact directory.
    pub fn load(dir: &Path) -> Result<Manifest> {
        let path = dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path)
            .map_err(|e| Error::ManifestInvalid(format!("{}: {e}", path.display())))?;
        Manifest::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Manifest> {
        let mut manifest = Manifest::default();
        let mut section: Option<Section> = None;
        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('@') {
                section = Some(match name.trim() {
                    "metadata" => Section::Metadata,
                    "description" => Section::Description,
                    "specs" => Section::Specs,
                    "sandbox" => Section::Sandbox,
                    "install" => Section::Install,
                    other => {
                        return Err(invalid(number, &format!("unknown section '@{other}'")))
                    }
                });
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(invalid(number, "expected 'key = value'"));
            };
            let key = key.trim();
            let value = value.trim();
            let Some(section) = section else {
                return Err(invalid(number, "entry before any @section"));
            };
            match section {
                Section::Metadata => match key {
                    "name" => manifest.name = value.to_string(),
                    "version" => manifest.version = value.to_string(),
                    "authors" => manifest.authors = value.to_string(),
                    "license" => manifest.license = value.to_string(),
                    "bin" => manifest.bins.push(value.to_string()),
                    other => {
                        return Err(invalid(number, &format!("unknown metadata key '{other}'")))
                    }
                },
                Section::Description => match key {
                    "summary" => manifest.summary = value.to_string(),
                    "long" => manifest.long = value.to_string(),
                    other => {
                        return Err(invalid(
                            number,
                            &format!("unknown description key '{other}'"),
                        ))
                    }
                },
                Section::Specs => {
                    if let Some(dep) = key.strip_prefix("dep.") {
                        manifest.deps.insert(dep.to_string(), value.to_string());
                    } else {
                        manifest
                            .system_specs
                            .insert(key.to_string(), value.to_string());
                    }
                }
                Section::Sandbox => match key {
                    "network" => manifest.sandbox.network = parse_flag(number, value)?,
                    "graphical" => manifest.sandbox.graphical = parse_flag(number, value)?,
                    "device" => manifest.sandbox.device = parse_flag(number, value)?,
                    "path" => manifest.sandbox.extra_paths.push(value.to_string()),
                    other => {
                        return Err(invalid(number, &format!("unknown sandbox key '{other}'")))
                    }
                },
                Section::Install => match key {
                    "run" => manifest.install_commands.push(value.to_string()),
                    other => {
                        return Err(invalid(number, &format!("unknown install key '{other}'")))
                    }
                },
            }
        }
        if manifest.name.is_empty() {
            return Err(Error::ManifestInvalid("missing metadata name".to_string()));
        }
        if manifest.version.is_empty() {
            return Err(Error::ManifestInvalid(
                "missing metadata version".to_string(),
            ));
        }
        Ok(manifest)
    }
}

fn parse_flag(number: usize, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(invalid(
            number,
            &format!("expected true or false, got '{other}'"),
        )),
    }
}

fn invalid(number: usize, message: &str) -> Error {
    Error::ManifestInvalid(format!("line {}: {message}", number + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "\
# sample manifest
@metadata
name = editor
version = 2.1-beta
authors = Jane Doe <jane@example.com>
license = GPL-3.0
bin = edit
bin = editctl

@description
summary = a text editor
long = a longer description of the editor

@specs
os = linux
dep.libfoo = >=1.2
dep.libbar = =0.9

@sandbox
network = true
graphical = true
device = false
path = /var/lib/editor

@install
run = ./configure
run = make install
";

    #[test]
    fn test_parse_full() {
        let m = Manifest::parse(FULL).unwrap();
        assert_eq!(m.name, "editor");
        assert_eq!(m.version, "2.1-beta");
        assert_eq!(m.bins, vec!["edit", "editctl"]);
        assert_eq!(m.summary, "a text editor");
        assert_eq!(m.system_specs.get("os").map(String::as_str), Some("linux"));
        assert_eq!(m.deps.get("libfoo").map(String::as_str), Some(">=1.2"));
        assert_eq!(m.deps.get("libbar").map(String::as_str), Some("=0.9"));
        assert!(m.sandbox.network);
        assert!(m.sandbox.graphical);
        assert!(!m.sandbox.device);
        assert_eq!(m.sandbox.extra_paths, vec!["/var/lib/editor"]);
        assert_eq!(m.install_commands, vec!["./configure", "make install"]);
    }

    #[test]
    fn test_parse_minimal() {
        let m = Manifest::parse("@metadata\nname = tiny\nversion = 0.1\n").unwrap();
        assert_eq!(m.name, "tiny");
        assert!(m.bins.is_empty());
        assert!(m.install_commands.is_empty());
        assert_eq!(m.sandbox, SandboxProfile::default());
    }

    #[test]
    fn test_missing_name_or_version() {
        assert!(matches!(
            Manifest::parse("@metadata\nversion = 0.1\n").unwrap_err(),
            Error::ManifestInvalid(_)
        ));
        assert!(matches!(
            Manifest::parse("@metadata\nname = tiny\n").unwrap_err(),
            Error::ManifestInvalid(_)
        ));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = Manifest::parse("@nonsense\nkey = value\n").unwrap_err();
        assert!(err.to_string().contains("unknown section"));
    }

    #[test]
    fn test_entry_before_section_rejected() {
        let err = Manifest::parse("name = tiny\n").unwrap_err();
        assert!(err.to_string().contains("before any @section"));
    }

    #[test]
    fn test_bad_flag_rejected() {
        let err = Manifest::parse(
            "@metadata\nname = t\nversion = 1\n@sandbox\nnetwork = yes\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("true or false"));
    }

    #[test]
    fn test_line_without_equals_rejected() {
        let err = Manifest::parse("@metadata\nname tiny\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }
}
