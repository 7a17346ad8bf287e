//! Sandbox helper invocation
//!
//! Third-party code only ever runs under the external namespace-isolation
//! helper. The engine builds the helper's argument vector from a fixed
//! default policy plus the manifest's profile and trusts its exit status;
//! it never touches namespace primitives itself.

use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::exec;
use crate::manifest::Manifest;

/// In-sandbox mount point of the artifact root.
pub const APP_MOUNT: &str = "/app";

/// Host directories bound read-only so shell utilities work inside.
const RO_BINDS: [&str; 5] = ["/usr", "/lib", "/lib64", "/bin", "/etc"];

/// Argument vector shared by install and run mode: default policy first,
/// then the profile's shares and binds.
fn base_args(app_dir: &Path, manifest: &Manifest) -> Vec<String> {
    let profile = &manifest.sandbox;
    let mut args: Vec<String> = Vec::new();
    for dir in RO_BINDS {
        if Path::new(dir).exists() {
            args.extend(exec::argv(["--ro-bind", dir, dir]));
        }
    }
    args.extend([
        "--bind".to_string(),
        app_dir.display().to_string(),
        APP_MOUNT.to_string(),
    ]);
    args.extend(exec::argv(["--chdir", APP_MOUNT]));
    args.extend(exec::argv([
        "--unshare-user",
        "--unshare-pid",
        "--unshare-uts",
        "--unshare-cgroup",
    ]));
    if !profile.network {
        args.push("--unshare-net".to_string());
    }
    if !profile.graphical {
        args.push("--unshare-ipc".to_string());
    }
    if profile.graphical {
        if Path::new("/tmp/.X11-unix").exists() {
            args.extend(exec::argv(["--ro-bind", "/tmp/.X11-unix", "/tmp/.X11-unix"]));
        }
        if let Ok(display) = env::var("DISPLAY") {
            args.extend(["--setenv".to_string(), "DISPLAY".to_string(), display]);
        }
    }
    if profile.device {
        args.extend(exec::argv(["--dev-bind", "/dev", "/dev"]));
    }
    for path in &profile.extra_paths {
        args.extend(["--bind".to_string(), path.clone(), path.clone()]);
    }
    args
}

/// Execute the manifest's install commands inside the sandbox.
///
/// An empty command list succeeds without spawning anything.
pub fn run_install(helper: &str, app_dir: &Path, manifest: &Manifest) -> Result<()> {
    if manifest.install_commands.is_empty() {
        return Ok(());
    }
    let script = manifest.install_commands.join(" && ");
    let mut argv = vec![helper.to_string()];
    argv.extend(base_args(app_dir, manifest));
    argv.extend(["sh".to_string(), "-c".to_string(), script]);
    match exec::status(&argv) {
        Ok(0) => Ok(()),
        Ok(code) => Err(Error::SandboxInstallFailed(format!("exit status {code}"))),
        Err(e) => Err(Error::SandboxInstallFailed(e.to_string())),
    }
}

/// Execute a declared binary inside the sandbox, returning its exit status.
pub fn run_binary(
    helper: &str,
    app_dir: &Path,
    manifest: &Manifest,
    binary: &str,
    extra_args: &[String],
) -> Result<i32> {
    let mut argv = vec![helper.to_string()];
    argv.extend(base_args(app_dir, manifest));
    argv.push(format!("{APP_MOUNT}/bin/{binary}"));
    argv.extend(extra_args.iter().cloned());
    exec::status(&argv).map_err(|_| Error::SandboxRunFailed(127))
}
