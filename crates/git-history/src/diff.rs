// Copyright 2026 Oxide Computer Company

//! Line-level diffs: parsing `git show`/`git log -p` output into files and
//! hunks.

use crate::DiffParseError;
use camino::{Utf8Path, Utf8PathBuf};
use std::{
    borrow::Cow,
    collections::{BTreeMap, btree_map},
};

/// Line counts shared by every level of a diff.
///
/// Containers delegate to their children, so the counts of a [`Diff`] are the
/// sums over its [`FileDiff`]s, which are in turn the sums over their
/// [`BlobDiff`]s.
pub trait Diffable {
    /// Returns the number of added lines.
    fn added_count(&self) -> usize;

    /// Returns the number of removed lines.
    fn removed_count(&self) -> usize;

    /// Returns the number of changed lines: added plus removed.
    ///
    /// A line that was modified in place shows up once as removed and once
    /// as added, so it counts twice. This is a changed-line count, not a
    /// count of distinct lines touched.
    fn changed_count(&self) -> usize {
        self.added_count() + self.removed_count()
    }
}

/// One hunk of a file diff: a contiguous block of added and removed lines.
///
/// Context lines are not stored. Added and removed lines are stored without
/// their leading marker column(s).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlobDiff {
    ranges: String,
    added: Vec<String>,
    removed: Vec<String>,
}

impl BlobDiff {
    /// Creates an empty hunk with the given line-range header.
    pub fn new(ranges: impl Into<String>) -> Self {
        BlobDiff { ranges: ranges.into(), added: Vec::new(), removed: Vec::new() }
    }

    /// Returns the line ranges from the hunk header, e.g. `-1,3 +1,4`.
    ///
    /// The value is passed through as git printed it.
    pub fn ranges(&self) -> &str {
        &self.ranges
    }

    /// Returns the added lines, in file order.
    pub fn added(&self) -> &[String] {
        &self.added
    }

    /// Returns the removed lines, in file order.
    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    /// Appends an added line.
    pub fn push_added(&mut self, line: impl Into<String>) {
        self.added.push(line.into());
    }

    /// Appends a removed line.
    pub fn push_removed(&mut self, line: impl Into<String>) {
        self.removed.push(line.into());
    }
}

impl Diffable for BlobDiff {
    fn added_count(&self) -> usize {
        self.added.len()
    }

    fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// The changes to a single file: its hunks, in file order.
///
/// Binary files and mode-only changes have no hunks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDiff {
    path: Utf8PathBuf,
    hunks: Vec<BlobDiff>,
}

impl FileDiff {
    /// Creates a file diff with no hunks.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        FileDiff { path: path.into(), hunks: Vec::new() }
    }

    /// Returns the path of the file, relative to the repository root.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the hunks of this file.
    pub fn hunks(&self) -> &[BlobDiff] {
        &self.hunks
    }

    /// Appends a hunk.
    pub fn push_hunk(&mut self, hunk: BlobDiff) {
        self.hunks.push(hunk);
    }
}

impl Diffable for FileDiff {
    fn added_count(&self) -> usize {
        self.hunks.iter().map(Diffable::added_count).sum()
    }

    fn removed_count(&self) -> usize {
        self.hunks.iter().map(Diffable::removed_count).sum()
    }
}

/// The changes made by one commit, keyed by file path.
///
/// Each path appears at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diff {
    files: BTreeMap<Utf8PathBuf, FileDiff>,
}

impl Diff {
    /// Creates an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the changes for one file.
    ///
    /// Returns an error if the diff already has changes for that path.
    pub fn add(&mut self, file: FileDiff) -> Result<(), DiffParseError> {
        match self.files.entry(file.path.clone()) {
            btree_map::Entry::Occupied(_) => {
                Err(DiffParseError::DuplicateFile { path: file.path })
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(file);
                Ok(())
            }
        }
    }

    /// Returns the changes for `path`, if this diff touches it.
    pub fn file(&self, path: impl AsRef<Utf8Path>) -> Option<&FileDiff> {
        self.files.get(path.as_ref())
    }

    /// Iterates over the changed files, ordered by path.
    pub fn files(&self) -> impl Iterator<Item = &FileDiff> {
        self.files.values()
    }

    /// Iterates over the changed paths, in order.
    pub fn paths(&self) -> impl Iterator<Item = &Utf8Path> {
        self.files.keys().map(|p| p.as_path())
    }

    /// Returns the number of changed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no files changed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl Diffable for Diff {
    fn added_count(&self) -> usize {
        self.files.values().map(Diffable::added_count).sum()
    }

    fn removed_count(&self) -> usize {
        self.files.values().map(Diffable::removed_count).sum()
    }
}

/// Parses the diff section of `git show` or `git log -p` output.
///
/// Recognizes `diff --git` sections as well as the combined sections
/// (`diff --cc`, `diff --combined`) that git prints for merge commits. Lines
/// before the first section header are ignored, so empty input yields an
/// empty [`Diff`].
///
/// Inside a hunk, each line is classified by its marker column (one column
/// per parent for combined diffs): a `+` marks an added line, otherwise a `-`
/// marks a removed line, and everything else is context. Git's own line
/// framing is taken as ground truth.
///
/// Lines are split on `\n` only, so a `\r` from a CRLF file stays part of
/// the line content.
///
/// Returns an error if a path appears in more than one section.
pub fn parse_diff(raw: &str) -> Result<Diff, DiffParseError> {
    let mut diff = Diff::new();
    let mut section: Option<Section> = None;

    for line in raw.split('\n') {
        if let Some(header_path) = section_header_path(line) {
            if let Some(done) = section.take() {
                diff.add(done.finish())?;
            }
            section = Some(Section::new(header_path));
            continue;
        }

        // Anything before the first section header is not part of a diff.
        let Some(current) = section.as_mut() else {
            continue;
        };
        current.feed(line);
    }

    if let Some(done) = section {
        diff.add(done.finish())?;
    }
    Ok(diff)
}

/// The file section being parsed.
#[derive(Debug)]
struct Section {
    header_path: Option<Utf8PathBuf>,
    old_path: Option<Utf8PathBuf>,
    new_path: Option<Utf8PathBuf>,
    hunks: Vec<BlobDiff>,
    /// The hunk being filled, along with its marker column width.
    hunk: Option<(BlobDiff, usize)>,
}

impl Section {
    fn new(header_path: Option<Utf8PathBuf>) -> Self {
        Section {
            header_path,
            old_path: None,
            new_path: None,
            hunks: Vec::new(),
            hunk: None,
        }
    }

    fn feed(&mut self, line: &str) {
        if line.starts_with("@@") {
            if let Some((hunk, _)) = self.hunk.take() {
                self.hunks.push(hunk);
            }
            let (ranges, width) = parse_hunk_header(line);
            self.hunk = Some((BlobDiff::new(ranges), width));
            return;
        }

        match self.hunk.as_mut() {
            Some((hunk, width)) => classify_hunk_line(hunk, *width, line),
            None => self.feed_extended_header(line),
        }
    }

    fn feed_extended_header(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix("--- ") {
            self.old_path = marker_path(rest, "a/");
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            self.new_path = marker_path(rest, "b/");
        } else if let Some(rest) = line
            .strip_prefix("rename to ")
            .or_else(|| line.strip_prefix("copy to "))
        {
            self.new_path = Some(Utf8PathBuf::from(unquote(rest).as_ref()));
        }
        // index, mode, similarity and "Binary files ... differ" lines carry
        // nothing beyond file identity.
    }

    fn finish(mut self) -> FileDiff {
        if let Some((hunk, _)) = self.hunk.take() {
            self.hunks.push(hunk);
        }
        // A deleted file has `+++ /dev/null`, so fall back to the old side.
        let path = self
            .new_path
            .or(self.old_path)
            .or(self.header_path)
            .unwrap_or_default();
        FileDiff { path, hunks: self.hunks }
    }
}

/// If `line` starts a file section, returns the path named in the header
/// (`None` if the header can't be split unambiguously).
fn section_header_path(line: &str) -> Option<Option<Utf8PathBuf>> {
    if let Some(rest) = line.strip_prefix("diff --git ") {
        return Some(split_git_header(rest));
    }
    let rest = line
        .strip_prefix("diff --cc ")
        .or_else(|| line.strip_prefix("diff --combined "))?;
    Some(Some(Utf8PathBuf::from(unquote(rest).as_ref())))
}

/// Splits `a/<old> b/<new>` into the new path.
fn split_git_header(rest: &str) -> Option<Utf8PathBuf> {
    // Unrenamed files have identical halves, which is the only reliable way
    // to split a path containing " b/".
    let len = rest.len();
    if len % 2 == 1 {
        let half = len / 2;
        if let (Some(left), Some(right)) = (rest.get(..half), rest.get(half + 1..))
        {
            if rest.as_bytes()[half] == b' ' {
                let left = unquote(left);
                let right = unquote(right);
                if let (Some(old), Some(new)) =
                    (left.strip_prefix("a/"), right.strip_prefix("b/"))
                {
                    if old == new {
                        return Some(Utf8PathBuf::from(new));
                    }
                }
            }
        }
    }

    let idx = rest.rfind(" b/").or_else(|| rest.rfind(" \"b/"))?;
    let right = unquote(&rest[idx + 1..]);
    right.strip_prefix("b/").map(Utf8PathBuf::from)
}

/// Parses the path of a `---`/`+++` line, returning `None` for `/dev/null`.
fn marker_path(rest: &str, prefix: &str) -> Option<Utf8PathBuf> {
    // Git appends a tab to these lines when the path contains spaces.
    let rest = unquote(rest.trim_end_matches('\t'));
    if rest == "/dev/null" {
        return None;
    }
    Some(Utf8PathBuf::from(rest.strip_prefix(prefix).unwrap_or(&*rest)))
}

/// Decodes a path git printed in C-style quotes, e.g. `"caf\303\251.txt"`.
///
/// Unquoted input is returned as is. Escaped bytes that don't form valid
/// UTF-8 are replaced with U+FFFD.
fn unquote(s: &str) -> Cow<'_, str> {
    let Some(inner) = s.strip_prefix('"').and_then(|s| s.strip_suffix('"'))
    else {
        return Cow::Borrowed(s);
    };

    let input = inner.as_bytes();
    let mut bytes = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        let b = input[i];
        i += 1;
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let Some(&escaped) = input.get(i) else {
            bytes.push(b'\\');
            break;
        };
        i += 1;
        match escaped {
            b'0'..=b'7' => {
                let mut value = u32::from(escaped - b'0');
                for _ in 0..2 {
                    match input.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            i += 1;
                        }
                        _ => break,
                    }
                }
                // Git only emits three-digit escapes of single bytes.
                bytes.push(u8::try_from(value).unwrap_or(b'?'));
            }
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'n' => bytes.push(b'\n'),
            b'r' => bytes.push(b'\r'),
            b't' => bytes.push(b'\t'),
            b'v' => bytes.push(0x0b),
            other => bytes.push(other),
        }
    }

    match String::from_utf8(bytes) {
        Ok(decoded) => Cow::Owned(decoded),
        Err(err) => {
            Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}

/// Parses `@@ -1,2 +1,3 @@ heading` (or `@@@ ... @@@` for combined diffs)
/// into the range text and the number of marker columns per line.
fn parse_hunk_header(line: &str) -> (String, usize) {
    let ats = line.bytes().take_while(|&b| b == b'@').count();
    let width = ats.saturating_sub(1).max(1);
    let rest = &line[ats..];
    let fence = &line[..ats];
    let ranges = match rest.find(fence) {
        Some(end) => &rest[..end],
        None => rest,
    };
    (ranges.trim().to_string(), width)
}

fn classify_hunk_line(hunk: &mut BlobDiff, width: usize, line: &str) {
    let Some(markers) = line.get(..width) else {
        return;
    };
    let content = &line[width..];
    if markers.contains('+') {
        hunk.push_added(content);
    } else if markers.contains('-') {
        hunk.push_removed(content);
    }
}
