// Copyright 2026 Oxide Computer Company

//! Error types for commit hash, diff, and commit record parsing.

use camino::Utf8PathBuf;
use thiserror::Error;

/// An error that occurs while parsing a
/// [`CommitHash`](crate::CommitHash).
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum CommitHashParseError {
    /// The commit hash was empty.
    #[error("commit hash is empty")]
    Empty,

    /// The commit hash has an invalid length.
    #[error(
        "invalid length: expected 40 (SHA-1) or 64 (SHA-256) hex characters, \
         got {0}"
    )]
    InvalidLength(usize),

    /// The commit hash is not valid hexadecimal.
    #[error("invalid hexadecimal")]
    InvalidHex(hex::FromHexError),
}

/// An error that occurs while parsing the diff section of `git show` or
/// `git log -p` output.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DiffParseError {
    /// The same path appeared in two file sections of one diff.
    ///
    /// Git never emits this for a single commit, so seeing it means the
    /// input was not what the parser assumes it is.
    #[error("diff already contains changes for {path}")]
    DuplicateFile {
        /// The repeated path.
        path: Utf8PathBuf,
    },
}

/// An error that occurs while parsing a commit record produced with the
/// fixed field template.
///
/// Every variant carries the raw record so that a mismatch against a new
/// git output format can be reported and the grammar widened.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum RecordParseError {
    /// The record ended before all fixed fields were read.
    #[error(
        "commit record is missing the {field} field \
         (please report this output): {raw:?}"
    )]
    MissingField {
        /// The name of the first missing field.
        field: &'static str,
        /// The raw record.
        raw: String,
    },

    /// A bulk record did not start with a commit hash.
    #[error("bulk commit record has no leading hash: {raw:?}")]
    MissingHash {
        /// The raw record.
        raw: String,
    },

    /// The leading hash of a bulk record was not a valid commit hash.
    #[error("invalid commit hash {value:?} in record: {raw:?}")]
    InvalidHash {
        /// The value that failed to parse.
        value: String,
        /// The raw record.
        raw: String,
        /// The underlying hash error.
        #[source]
        source: CommitHashParseError,
    },

    /// A parent hash was not a valid commit hash.
    #[error("invalid parent hash {value:?} in record: {raw:?}")]
    InvalidParent {
        /// The value that failed to parse.
        value: String,
        /// The raw record.
        raw: String,
        /// The underlying hash error.
        #[source]
        source: CommitHashParseError,
    },

    /// A date field could not be parsed.
    #[error("invalid {field} {value:?} in record: {raw:?}")]
    InvalidDate {
        /// The name of the date field.
        field: &'static str,
        /// The value that failed to parse.
        value: String,
        /// The raw record.
        raw: String,
        /// The underlying date parse error.
        #[source]
        source: chrono::ParseError,
    },

    /// The author name field was empty.
    #[error("empty {field} in record: {raw:?}")]
    EmptyName {
        /// The name of the field.
        field: &'static str,
        /// The raw record.
        raw: String,
    },
}
