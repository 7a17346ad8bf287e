//! Domain errors for engine operations
//!
//! A single closed sum: every failure an operation can surface is one of
//! these variants. The command handler prints the one-line message and
//! exits non-zero; nothing is recovered silently past this boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("failed to load package index: {0}")]
    IndexLoad(String),

    #[error("failed to load state journal: {0}")]
    JournalLoad(String),

    #[error("another operation holds the lock (pid {0})")]
    LockHeld(i32),

    #[error("download failed: {0}")]
    Download(String),

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("install script failed: {0}")]
    SandboxInstallFailed(String),

    #[error("sandboxed run failed with status {0}")]
    SandboxRunFailed(i32),

    #[error("invalid manifest: {0}")]
    ManifestInvalid(String),

    #[error("package '{0}' not found in index")]
    PackageNotFound(String),

    #[error("package '{0}' is not installed")]
    PackageNotInstalled(String),

    #[error("version '{version}' of '{package}' not found")]
    VersionNotFound { package: String, version: String },

    #[error("version conflict for '{package}': {chosen} already selected, but '{requirement}' is required")]
    VersionConflict {
        package: String,
        chosen: String,
        requirement: String,
    },

    #[error("dependency cycle involving '{0}'")]
    DependencyCycle(String),

    #[error("no version of '{package}' satisfies '{requirement}'")]
    NoSatisfyingVersion { package: String, requirement: String },

    #[error("atomic publish failed: {0}")]
    AtomicPublishFailed(String),

    #[error("permission denied: {0}")]
    PermissionError(String),

    #[error("verification failed: {0}")]
    VerificationFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
