//! Well-known filesystem locations
//!
//! Every absolute path the engine touches flows from a [`Paths`] value built
//! once per process. `SILO_ROOT` relocates the whole tree under a scratch
//! root, which is how the test suite runs against a throwaway filesystem.

use std::env;
use std::path::{Path, PathBuf};

/// Default catalogue location; `SILO_INDEX_URL` overrides.
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/silo-pm/index/main/index.json";

/// Default engine release location; `SILO_RELEASE_URL` overrides. Serves
/// `VERSION`, `silo`, and `silo-sandbox`.
pub const DEFAULT_RELEASE_URL: &str =
    "https://raw.githubusercontent.com/silo-pm/release/main";

#[derive(Debug, Clone)]
pub struct Paths {
    /// Unpacked artifacts: `<store>/<package>/<version>/`.
    pub store_root: PathBuf,
    /// Downloaded archives, prunable at any time.
    pub cache_root: PathBuf,
    /// Cached copy of the remote index document.
    pub index_file: PathBuf,
    /// Durable record of installed versions.
    pub journal_file: PathBuf,
    /// Pid lock serializing mutating operations.
    pub lock_file: PathBuf,
    /// Launcher script directory.
    pub bin_dir: PathBuf,
    /// Engine version record maintained by `upgrade`.
    pub version_file: PathBuf,
    /// Namespace-isolation helper, resolved against `PATH`.
    pub sandbox_helper: String,
    pub index_url: String,
    pub release_url: String,
}

impl Paths {
    pub fn from_env() -> Paths {
        let mut paths = match env::var_os("SILO_ROOT") {
            Some(root) => Paths::under_root(Path::new(&root)),
            None => Paths::system(),
        };
        if let Ok(helper) = env::var("SILO_SANDBOX") {
            paths.sandbox_helper = helper;
        }
        if let Ok(url) = env::var("SILO_INDEX_URL") {
            paths.index_url = url;
        }
        if let Ok(url) = env::var("SILO_RELEASE_URL") {
            paths.release_url = url;
        }
        paths
    }

    /// Conventional system-wide layout.
    fn system() -> Paths {
        let cache_root = dirs::home_dir()
            .map(|home| home.join(".cache/silo"))
            .unwrap_or_else(|| PathBuf::from("/var/cache/silo"));
        Paths {
            store_root: PathBuf::from("/usr/lib/silo/store"),
            cache_root,
            index_file: PathBuf::from("/var/lib/silo/index.json"),
            journal_file: PathBuf::from("/var/lib/silo/state.json"),
            lock_file: PathBuf::from("/var/lib/silo/lock"),
            bin_dir: PathBuf::from("/usr/bin"),
            version_file: PathBuf::from("/usr/lib/silo/version"),
            sandbox_helper: "silo-sandbox".to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            release_url: DEFAULT_RELEASE_URL.to_string(),
        }
    }

    /// The same layout relocated under `root`.
    pub fn under_root(root: &Path) -> Paths {
        Paths {
            store_root: root.join("usr/lib/silo/store"),
            cache_root: root.join("cache"),
            index_file: root.join("var/lib/silo/index.json"),
            journal_file: root.join("var/lib/silo/state.json"),
            lock_file: root.join("var/lib/silo/lock"),
            bin_dir: root.join("usr/bin"),
            version_file: root.join("usr/lib/silo/version"),
            sandbox_helper: "silo-sandbox".to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            release_url: DEFAULT_RELEASE_URL.to_string(),
        }
    }

    pub fn package_dir(&self, package: &str) -> PathBuf {
        self.store_root.join(package)
    }

    pub fn version_dir(&self, package: &str, version: &str) -> PathBuf {
        self.package_dir(package).join(version)
    }

    /// Staging sibling populated before the atomic rename to `version_dir`.
    pub fn staging_dir(&self, package: &str, version: &str) -> PathBuf {
        self.package_dir(package).join(format!("{version}.tmp"))
    }

    pub fn current_link(&self, package: &str) -> PathBuf {
        self.package_dir(package).join("current")
    }

    pub fn cached_archive(&self, package: &str, version: &str) -> PathBuf {
        self.cache_root.join(format!("{package}-{version}.archive"))
    }
}
