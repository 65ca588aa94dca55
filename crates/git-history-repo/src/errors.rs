// Copyright 2026 Oxide Computer Company

//! Error types for running git and loading commits.

use camino::Utf8PathBuf;
use git_history::{
    CommitHash, CommitHashParseError, DiffParseError, RecordParseError,
};
use std::{ffi::OsString, io, string::FromUtf8Error};
use thiserror::Error;

/// An error from reading the git binary path from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GitEnvError {
    /// The environment variable is set but is not valid UTF-8.
    #[error(
        "${var} environment variable is not valid \
         UTF-8: {value:?}"
    )]
    NonUtf8 {
        /// The environment variable name.
        var: &'static str,
        /// The non-UTF-8 value.
        value: OsString,
    },
}

/// An error that occurs while selecting a repository root.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpenError {
    /// The repository root was the empty string.
    #[error(
        "repository root is empty \
         (use \".\" for the current directory)"
    )]
    EmptyRoot,

    /// The provided repository root does not exist.
    #[error("{repo_root} does not exist (expected a repository root with .git)")]
    PathNotFound {
        /// The path that was provided.
        repo_root: Utf8PathBuf,
    },

    /// The provided repository root is not a directory.
    #[error(
        "{repo_root} is not a directory \
         (expected a repository root with .git)"
    )]
    NotADirectory {
        /// The path that was provided.
        repo_root: Utf8PathBuf,
    },

    /// An I/O error occurred while probing the repository root.
    #[error("I/O error while checking for git at {path}")]
    Io {
        /// The path being checked when the error occurred.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// No `.git` was found at the repository root.
    #[error("{repo_root} is not a git repository (no .git found)")]
    NotARepository {
        /// The repository root that was searched.
        repo_root: Utf8PathBuf,
    },

    /// The `$GIT` environment variable is not valid UTF-8.
    #[error(transparent)]
    Env(#[from] GitEnvError),
}

/// An error that occurs while running git.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// Failed to spawn the git process.
    #[error("failed to run {binary_path:?} in {working_dir}")]
    SpawnFailed {
        /// The path to the git executable.
        binary_path: String,
        /// The working directory where the command was run.
        working_dir: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Git exited unsuccessfully.
    #[error(
        "`{binary_path} {}` failed in {working_dir} ({exit_status}): {stderr}",
        .args.join(" ")
    )]
    Failed {
        /// The path to the git executable.
        binary_path: String,
        /// The arguments passed to git.
        args: Vec<String>,
        /// The working directory where the command was run.
        working_dir: Utf8PathBuf,
        /// A human-readable description of the exit status (e.g.,
        /// "exit status: 128" or "signal: 9").
        exit_status: String,
        /// The stderr output from git.
        stderr: String,
    },

    /// Git printed output that is not valid UTF-8, and the repository uses
    /// [`DecodePolicy::Strict`](crate::DecodePolicy::Strict).
    #[error("`git {}` produced output that is not valid UTF-8", .args.join(" "))]
    NonUtf8Output {
        /// The arguments passed to git.
        args: Vec<String>,
        /// The underlying decoding error.
        #[source]
        source: FromUtf8Error,
    },
}

impl RunError {
    /// Returns true if git ran and exited unsuccessfully.
    ///
    /// Call sites that expect failure (e.g. probing whether a path exists
    /// at a revision) use this to tell "no" apart from "couldn't ask".
    pub fn is_nonzero_exit(&self) -> bool {
        matches!(self, RunError::Failed { .. })
    }
}

/// An error from looking up an entity in the
/// [`EntityCache`](crate::EntityCache).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// The commit hash was empty or malformed.
    #[error("invalid commit hash {value:?}")]
    InvalidHash {
        /// The value that was provided.
        value: String,
        /// The underlying parse error.
        #[source]
        source: CommitHashParseError,
    },

    /// The author is not known and no email was given to create it with.
    #[error(
        "unknown author {name:?} (an email is required \
         to register a new author)"
    )]
    UnknownAuthor {
        /// The trimmed author name.
        name: String,
    },
}

/// An error that occurs while loading commits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// Running git failed.
    #[error("failed to query git for commit data")]
    Run(#[from] RunError),

    /// The record for a single commit did not match the grammar.
    #[error("failed to parse git output for commit {hash}")]
    Record {
        /// The commit being loaded.
        hash: CommitHash,
        /// The underlying parse error.
        #[source]
        source: RecordParseError,
    },

    /// A record in bulk history output did not match the grammar.
    #[error("failed to parse git history output")]
    BulkRecord(#[source] RecordParseError),

    /// The diff of a commit could not be parsed.
    #[error("failed to parse diff for commit {hash}")]
    Diff {
        /// The commit being loaded.
        hash: CommitHash,
        /// The underlying parse error.
        #[source]
        source: DiffParseError,
    },
}

/// An error from [`Commit::changes_for`](crate::Commit::changes_for).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChangesError {
    /// Loading the commit failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The commit did not change the path.
    #[error("commit {hash} has no changes for {path}")]
    NoChanges {
        /// The commit that was queried.
        hash: CommitHash,
        /// The path that was requested.
        path: Utf8PathBuf,
    },
}

/// An error that occurs while resolving revisions, refs, or file history to
/// commits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Running git failed.
    #[error(transparent)]
    Run(#[from] RunError),

    /// Git printed something other than full commit hashes.
    #[error("expected commit hashes from git, got {output:?}")]
    InvalidOutput {
        /// The output that could not be parsed.
        output: String,
        /// The underlying parse error.
        #[source]
        source: CommitHashParseError,
    },

    /// No tag with this name exists.
    #[error("no tag named {name:?}")]
    UnknownTag {
        /// The requested tag name.
        name: String,
    },
}

/// An error from [`Repository::clone`](crate::Repository::clone).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CloneError {
    /// No repository name could be derived from the address.
    #[error(
        "cannot derive a directory name from \
         repository address {address:?}"
    )]
    InvalidAddress {
        /// The address that was provided.
        address: String,
    },

    /// The clone location could not be created.
    #[error("failed to create clone location {path}")]
    CreateDir {
        /// The location that was being created.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The `$GIT` environment variable is not valid UTF-8.
    #[error(transparent)]
    Env(#[from] GitEnvError),

    /// `git clone` or `git pull` failed.
    #[error(transparent)]
    Run(#[from] RunError),

    /// The cloned directory could not be opened as a repository.
    #[error(transparent)]
    Open(#[from] OpenError),
}
