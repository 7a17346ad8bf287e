//! External process invocation
//!
//! The engine delegates downloading, archive handling, and sandboxing to
//! helper programs; this module is the single place they are spawned. Bare
//! program names resolve against `PATH`, paths are used verbatim, stdio is
//! inherited, and there is no retry policy.

use std::io;
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn '{program}': {source}")]
    Spawn { program: String, source: io::Error },

    #[error("'{program}' was terminated by a signal")]
    Wait { program: String },
}

/// Run an argument vector to completion and return the child's exit status.
pub fn status(argv: &[String]) -> Result<i32, ExecError> {
    let program = argv.first().cloned().unwrap_or_default();
    if program.is_empty() {
        return Err(ExecError::Spawn {
            program,
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector"),
        });
    }
    debug!(command = %argv.join(" "), "spawning helper");
    let status = Command::new(&program)
        .args(&argv[1..])
        .status()
        .map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;
    status.code().ok_or(ExecError::Wait { program })
}

/// Convenience for building an argument vector from borrowed pieces.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reports_exit_code() {
        assert_eq!(status(&argv(["true"])).unwrap(), 0);
        assert_eq!(status(&argv(["false"])).unwrap(), 1);
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = status(&argv(["silo-test-no-such-program"])).unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[test]
    fn test_empty_argv_is_spawn_error() {
        assert!(matches!(status(&[]).unwrap_err(), ExecError::Spawn { .. }));
    }
}
