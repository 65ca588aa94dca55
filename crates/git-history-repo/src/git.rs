// Copyright 2026 Oxide Computer Company

//! Running git and validating repository roots.

use crate::{GitEnvError, OpenError, RunError};
use camino::Utf8Path;
use fs_err as fs;
use std::{fmt, io, process::Command};
use tracing::warn;

/// Runs git with a set of arguments in a working directory.
///
/// [`Git`] is the real implementation. Tests substitute their own to feed
/// canned output and count invocations.
///
/// Invocations against the same working directory are not synchronized;
/// callers that overlap them must serialize them.
pub trait GitRunner: fmt::Debug {
    /// Runs git with `args` in `working_dir` and returns its stdout.
    ///
    /// Returns [`RunError::Failed`] if git exits unsuccessfully.
    fn run(
        &self,
        args: &[&str],
        working_dir: &Utf8Path,
    ) -> Result<Vec<u8>, RunError>;
}

/// How git output is turned into text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DecodePolicy {
    /// Invalid UTF-8 is an error.
    #[default]
    Strict,
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    Lossy,
}

impl DecodePolicy {
    pub(crate) fn decode(
        self,
        stdout: Vec<u8>,
        args: &[&str],
    ) -> Result<String, RunError> {
        match String::from_utf8(stdout) {
            Ok(s) => Ok(s),
            Err(source) => match self {
                DecodePolicy::Strict => Err(RunError::NonUtf8Output {
                    args: args.iter().map(|s| s.to_string()).collect(),
                    source,
                }),
                DecodePolicy::Lossy => {
                    warn!(
                        ?args,
                        "git output is not valid UTF-8, replacing \
                         invalid sequences"
                    );
                    Ok(String::from_utf8_lossy(source.as_bytes()).into_owned())
                }
            },
        }
    }
}

/// Reads the git binary path from an environment variable, falling back
/// to `default` if the variable is unset or empty.
///
/// The value is trimmed of leading and trailing whitespace.
///
/// Returns an error if the variable is set but is not valid UTF-8.
fn read_git_env(
    var: &'static str,
    default: &str,
) -> Result<String, GitEnvError> {
    match std::env::var(var) {
        Ok(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(default.to_string())
            } else {
                Ok(trimmed.to_string())
            }
        }
        Err(std::env::VarError::NotPresent) => Ok(default.to_string()),
        Err(std::env::VarError::NotUnicode(value)) => {
            Err(GitEnvError::NonUtf8 { var, value })
        }
    }
}

/// The git command-line tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Git {
    binary: String,
}

impl Git {
    /// Uses the `$GIT` environment variable, or `"git"`.
    ///
    /// Returns an error if the `$GIT` environment variable is set
    /// but is not valid UTF-8.
    pub fn from_env() -> Result<Self, GitEnvError> {
        let binary = read_git_env("GIT", "git")?;
        Ok(Git { binary })
    }

    /// Uses the git binary at `binary`.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Git { binary: binary.into() }
    }

    /// Returns the path to the git binary.
    pub fn binary(&self) -> &str {
        &self.binary
    }
}

impl GitRunner for Git {
    fn run(
        &self,
        args: &[&str],
        working_dir: &Utf8Path,
    ) -> Result<Vec<u8>, RunError> {
        let output = Command::new(&self.binary)
            .current_dir(working_dir)
            .args(args)
            .output()
            .map_err(|source| RunError::SpawnFailed {
                binary_path: self.binary.clone(),
                working_dir: working_dir.to_owned(),
                source,
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RunError::Failed {
                binary_path: self.binary.clone(),
                args: args.iter().map(|s| s.to_string()).collect(),
                working_dir: working_dir.to_owned(),
                exit_status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            })
        }
    }
}

/// Checks that `repo_root` is a directory containing `.git`.
///
/// `.git` may be a directory or a file, as in worktrees and submodules.
pub(crate) fn check_repo_root(repo_root: &Utf8Path) -> Result<(), OpenError> {
    if repo_root.as_str().is_empty() {
        return Err(OpenError::EmptyRoot);
    }

    // Use metadata() to distinguish "not a directory" from I/O
    // errors (e.g., permission denied).
    match fs::metadata(repo_root) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(OpenError::NotADirectory {
                repo_root: repo_root.to_owned(),
            });
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(OpenError::PathNotFound {
                repo_root: repo_root.to_owned(),
            });
        }
        Err(err) => {
            return Err(OpenError::Io {
                path: repo_root.to_owned(),
                source: err,
            });
        }
    }

    let git_path = repo_root.join(".git");
    match git_path.try_exists() {
        Ok(true) => Ok(()),
        Ok(false) => Err(OpenError::NotARepository {
            repo_root: repo_root.to_owned(),
        }),
        Err(source) => Err(OpenError::Io { path: git_path, source }),
    }
}
