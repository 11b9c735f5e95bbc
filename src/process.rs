//! External command execution for the maintainer tools.
//!
//! Commands run with inherited stdio so the tools' own diagnostics reach the
//! terminal. Failures are reported as a `StepOutcome`, never as an error.

use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Command, Stdio};

/// What happened when a command was run in best-effort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Exited with status 0.
    Succeeded,
    /// Exited non-zero (code is None when killed by a signal).
    Failed { code: Option<i32> },
    /// Program not found.
    Missing,
    /// Program exists but could not be started (EACCES, ENOEXEC, ...).
    NotExecutable { errno: Option<i32> },
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Succeeded)
    }

    fn from_spawn_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => StepOutcome::Missing,
            _ => StepOutcome::NotExecutable {
                errno: err.raw_os_error(),
            },
        }
    }
}

impl std::fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepOutcome::Succeeded => write!(f, "ok"),
            StepOutcome::Failed { code: Some(code) } => write!(f, "failed (exit code {})", code),
            StepOutcome::Failed { code: None } => write!(f, "failed (killed by signal)"),
            StepOutcome::Missing => write!(f, "not found"),
            StepOutcome::NotExecutable { errno: Some(errno) } => {
                write!(f, "could not start (os error {})", errno)
            }
            StepOutcome::NotExecutable { errno: None } => write!(f, "could not start"),
        }
    }
}

/// A program plus arguments, kept as OS strings so non-UTF-8 paths pass
/// through unchanged.
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
}

impl Cmd {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Run the command with inherited stdio and swallow every failure.
    ///
    /// Blocks until the child exits.
    pub fn run_best_effort(self) -> StepOutcome {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status();

        match status {
            Ok(status) if status.success() => StepOutcome::Succeeded,
            Ok(status) => StepOutcome::Failed {
                code: status.code(),
            },
            Err(err) => StepOutcome::from_spawn_error(&err),
        }
    }
}

/// Resolve a program in PATH (or accept it as-is if it is a path).
pub fn which(program: impl AsRef<OsStr>) -> Option<String> {
    which::which(program)
        .ok()
        .map(|path| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    #[test]
    fn test_best_effort_success() {
        assert_eq!(Cmd::new("true").run_best_effort(), StepOutcome::Succeeded);
    }

    #[test]
    fn test_best_effort_nonzero_exit() {
        let outcome = Cmd::new("sh").args(["-c", "exit 3"]).run_best_effort();
        assert_eq!(outcome, StepOutcome::Failed { code: Some(3) });
    }

    #[test]
    fn test_best_effort_missing_program() {
        let outcome = Cmd::new("nonexistent_program_12345").run_best_effort();
        assert_eq!(outcome, StepOutcome::Missing);
    }

    #[test]
    fn test_best_effort_non_executable_is_not_missing() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("no-exec-bit");
        fs::write(&script, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o644)).unwrap();

        let outcome = Cmd::new(&script).run_best_effort();

        assert!(
            matches!(outcome, StepOutcome::NotExecutable { errno: Some(_) }),
            "got {:?}",
            outcome
        );
        assert!(outcome.to_string().starts_with("could not start"));
    }

    #[test]
    fn test_which() {
        assert!(which("sh").is_some());
        assert!(which("nonexistent_program_12345").is_none());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(StepOutcome::Succeeded.to_string(), "ok");
        assert_eq!(
            StepOutcome::Failed { code: Some(2) }.to_string(),
            "failed (exit code 2)"
        );
        assert_eq!(StepOutcome::Missing.to_string(), "not found");
        assert_eq!(
            StepOutcome::NotExecutable { errno: Some(13) }.to_string(),
            "could not start (os error 13)"
        );
    }
}
