// Copyright 2026 Oxide Computer Company

//! Commit records: the fixed-field output of `git show` and `git log`.
//!
//! The field order and delimiters of [`SHOW_FORMAT`] and [`LOG_FORMAT`] are
//! the contract between the invoker and [`parse_commit_record`]; change them
//! together or not at all.

use crate::{CommitHash, CommitHashParseError, RecordParseError};
use chrono::{DateTime, FixedOffset};

/// The `--pretty=format:` template for a single commit.
///
/// One field per line: parent hashes, author name, author email, author
/// date, committer name, committer email, committer date, subject, then the
/// body terminated by [`BODY_END`]. Git follows it with the diff, if any.
pub const SHOW_FORMAT: &str =
    "%P%n%an%n%ae%n%ai%n%cn%n%ce%n%ci%n%s%n%b%x1e";

/// The `--pretty=format:` template for bulk history queries.
///
/// Each record is [`SHOW_FORMAT`] prefixed by a NUL byte and the commit
/// hash on its own line. Commit messages and text diffs can't contain NUL,
/// so it marks record boundaries unambiguously.
pub const LOG_FORMAT: &str =
    "%x00%H%n%P%n%an%n%ae%n%ai%n%cn%n%ce%n%ci%n%s%n%b%x1e";

/// The byte (ASCII record separator) that ends the commit body in
/// [`SHOW_FORMAT`] and [`LOG_FORMAT`] output.
///
/// A body line may look like a diff header, so the body can't be told apart
/// from the diff by content alone.
pub const BODY_END: char = '\x1e';

/// The format of `%ai` and `%ci` dates, e.g. `2020-01-01 10:00:00 +0000`.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A person and time attached to a commit, as either author or committer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// The display name, trimmed.
    pub name: String,
    /// The email address, trimmed.
    pub email: String,
    /// The timestamp, with the recorded timezone offset.
    pub date: DateTime<FixedOffset>,
}

/// The parsed fields of one commit record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRecord {
    /// The parent hashes, in order. Empty for a root commit.
    pub parents: Vec<CommitHash>,
    /// The author.
    pub author: Signature,
    /// The committer.
    pub committer: Signature,
    /// The first line of the commit message.
    pub title: String,
    /// The rest of the commit message, trimmed. Empty if there is no body.
    pub message: String,
    /// The unparsed diff section, starting at the first file header. Empty
    /// if the output had no diff.
    pub diff_text: String,
}

/// Parses one record produced with [`SHOW_FORMAT`].
///
/// The body ends at [`BODY_END`]. Records without it are also accepted; their
/// body ends at the first line that starts a diff section.
///
/// Returns an error, including the raw record, if a fixed field is missing,
/// a date or parent hash is malformed, or a name is empty.
pub fn parse_commit_record(raw: &str) -> Result<CommitRecord, RecordParseError> {
    let mut fields = raw.splitn(9, '\n');
    let mut next = |field: &'static str| {
        fields.next().ok_or_else(|| RecordParseError::MissingField {
            field,
            raw: raw.to_owned(),
        })
    };

    let parents = next("parent hashes")?;
    let author_name = next("author name")?;
    let author_email = next("author email")?;
    let author_date = next("author date")?;
    let committer_name = next("committer name")?;
    let committer_email = next("committer email")?;
    let committer_date = next("committer date")?;
    let title = next("subject")?;
    // A record cut off right after the subject has neither body nor diff.
    let rest = fields.next().unwrap_or("");

    let parents = parents
        .split_whitespace()
        .map(|value| {
            value.parse().map_err(|source| RecordParseError::InvalidParent {
                value: value.to_owned(),
                raw: raw.to_owned(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let author = parse_signature(
        raw,
        ("author name", author_name),
        author_email,
        ("author date", author_date),
    )?;
    let committer = parse_signature(
        raw,
        ("committer name", committer_name),
        committer_email,
        ("committer date", committer_date),
    )?;

    let (message, diff_text) = match rest.split_once(BODY_END) {
        Some((message, diff_text)) => {
            (message, diff_text.trim_start_matches('\n'))
        }
        None => rest.split_at(find_diff_start(rest)),
    };
    Ok(CommitRecord {
        parents,
        author,
        committer,
        title: title.trim().to_owned(),
        message: message.trim().to_owned(),
        diff_text: diff_text.to_owned(),
    })
}

/// Parses one record produced with [`LOG_FORMAT`], after splitting with
/// [`split_log_records`].
pub fn parse_log_record(
    raw: &str,
) -> Result<(CommitHash, CommitRecord), RecordParseError> {
    let (hash, rest) = raw
        .split_once('\n')
        .ok_or_else(|| RecordParseError::MissingHash { raw: raw.to_owned() })?;
    let hash = hash.trim();
    if hash.is_empty() {
        return Err(RecordParseError::MissingHash { raw: raw.to_owned() });
    }
    let hash = hash.parse().map_err(|source| RecordParseError::InvalidHash {
        value: hash.to_owned(),
        raw: raw.to_owned(),
        source,
    })?;
    Ok((hash, parse_commit_record(rest)?))
}

/// Splits `git log --pretty=format:<LOG_FORMAT>` output into records.
///
/// Empty output yields no records.
pub fn split_log_records(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('\0').filter(|record| !record.trim().is_empty())
}

/// Parses output with one full commit hash per line, such as
/// `git log --pretty=format:%H` or `git rev-list`. Blank lines are skipped.
pub fn parse_hash_lines(
    raw: &str,
) -> Result<Vec<CommitHash>, CommitHashParseError> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}

fn parse_signature(
    raw: &str,
    (name_field, name): (&'static str, &str),
    email: &str,
    (date_field, date): (&'static str, &str),
) -> Result<Signature, RecordParseError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(RecordParseError::EmptyName {
            field: name_field,
            raw: raw.to_owned(),
        });
    }
    let date = DateTime::parse_from_str(date.trim(), DATE_FORMAT).map_err(
        |source| RecordParseError::InvalidDate {
            field: date_field,
            value: date.to_owned(),
            raw: raw.to_owned(),
            source,
        },
    )?;
    Ok(Signature {
        name: name.to_owned(),
        email: email.trim().to_owned(),
        date,
    })
}

/// Returns the byte offset of the first diff section header in `rest`, or
/// `rest.len()` if there is none.
fn find_diff_start(rest: &str) -> usize {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.starts_with("diff --git ")
            || line.starts_with("diff --cc ")
            || line.starts_with("diff --combined ")
        {
            return offset;
        }
        offset += line.len();
    }
    rest.len()
}
