//! Shared harness for integration tests
//!
//! Every test runs the real binary against a throwaway root (`SILO_ROOT`)
//! with the sandbox helper stubbed out by `true`, and seeds the cache and
//! index by hand so nothing touches the network.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

pub struct TestContext {
    root: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            root: TempDir::new().expect("failed to create temp root"),
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn silo(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_silo"))
            .args(args)
            .env("SILO_ROOT", self.path())
            .env("HOME", self.path())
            .env("SILO_SANDBOX", "true")
            .output()
            .expect("failed to run silo")
    }

    pub fn store(&self) -> PathBuf {
        self.path().join("usr/lib/silo/store")
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.path().join("usr/bin")
    }

    pub fn cache(&self) -> PathBuf {
        self.path().join("cache")
    }

    pub fn journal_path(&self) -> PathBuf {
        self.path().join("var/lib/silo/state.json")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.path().join("var/lib/silo/lock")
    }

    pub fn journal(&self) -> serde_json::Value {
        let data = fs::read_to_string(self.journal_path()).expect("journal missing");
        serde_json::from_str(&data).expect("journal unparseable")
    }

    pub fn write_index(&self, json: &str) {
        let file = self.path().join("var/lib/silo/index.json");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, json).unwrap();
    }

    /// Stage a minimal artifact tree and pack it into the cache, returning
    /// the archive's SHA-256 digest.
    pub fn seed_archive(&self, package: &str, version: &str, manifest: &str) -> String {
        let staging = self.path().join(format!("seed-{package}-{version}"));
        fs::create_dir_all(staging.join("bin")).unwrap();
        fs::create_dir_all(staging.join("files")).unwrap();
        fs::write(staging.join("manifest.silo"), manifest).unwrap();
        fs::write(staging.join("bin").join(package), "#!/bin/sh\nexit 0\n").unwrap();
        fs::write(staging.join("files/payload.txt"), "payload").unwrap();

        fs::create_dir_all(self.cache()).unwrap();
        let archive = self.cache().join(format!("{package}-{version}.archive"));
        let status = Command::new("tar")
            .args([
                "-czf",
                archive.to_str().unwrap(),
                "-C",
                staging.to_str().unwrap(),
                ".",
            ])
            .status()
            .expect("tar not available");
        assert!(status.success(), "failed to pack seed archive");
        fs::remove_dir_all(&staging).unwrap();

        silo::hash::sha256_file(&archive).unwrap()
    }
}

pub fn manifest_text(name: &str, version: &str) -> String {
    format!(
        "@metadata\n\
         name = {name}\n\
         version = {version}\n\
         authors = Test Author\n\
         license = MIT\n\
         bin = {name}\n\
         @description\n\
         summary = test package\n\
         @sandbox\n\
         network = false\n\
         @install\n\
         run = true\n"
    )
}

pub fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
