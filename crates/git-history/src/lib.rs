// Copyright 2026 Oxide Computer Company

//! Parsers and types for git commit records and line-level diffs.
//!
//! This crate has no side effects: it turns the text that `git show` and
//! `git log` print into typed values. Running git, caching commits, and
//! loading them lazily live in
//! [`git-history-repo`](https://crates.io/crates/git-history-repo).
//!
//! The main entry points are [`parse_commit_record`] and [`parse_diff`].
//!
//! # Examples
//!
//! ```
//! use git_history::{Diffable, parse_commit_record, parse_diff};
//!
//! // Output of `git show --pretty=format:<SHOW_FORMAT> <hash>` for a root
//! // commit (the first line, the parent hashes, is empty).
//! let raw = "\nAlice\nalice@x.com\n2020-01-01 10:00:00 +0000\n\
//!            Alice\nalice@x.com\n2020-01-01 10:00:00 +0000\n\
//!            Fix bug\n\n\
//!            diff --git a/f.txt b/f.txt\n\
//!            index 0000000..1111111 100644\n\
//!            --- a/f.txt\n\
//!            +++ b/f.txt\n\
//!            @@ -1,1 +1,2 @@\n \
//!            line1\n\
//!            +line2\n";
//!
//! let record = parse_commit_record(raw).unwrap();
//! assert!(record.parents.is_empty());
//! assert_eq!(record.author.name, "Alice");
//! assert_eq!(record.title, "Fix bug");
//!
//! let diff = parse_diff(&record.diff_text).unwrap();
//! let file = diff.file("f.txt").unwrap();
//! assert_eq!(file.hunks().len(), 1);
//! assert_eq!(file.added_count(), 1);
//! assert_eq!(diff.changed_count(), 1);
//! ```

#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/git-history/0.1.0")]

mod diff;
mod errors;
mod hash;
mod record;

pub use diff::{BlobDiff, Diff, Diffable, FileDiff, parse_diff};
pub use errors::{CommitHashParseError, DiffParseError, RecordParseError};
pub use hash::CommitHash;
pub use record::{
    BODY_END, CommitRecord, LOG_FORMAT, SHOW_FORMAT, Signature,
    parse_commit_record, parse_hash_lines, parse_log_record, split_log_records,
};
