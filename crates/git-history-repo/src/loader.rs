// Copyright 2026 Oxide Computer Company

//! Turning git output into loaded commits.

use crate::{
    Commit, EntityCache, LoadError, Repository, commit::CommitData,
};
use git_history::{
    CommitRecord, Diff, LOG_FORMAT, SHOW_FORMAT, parse_commit_record,
    parse_diff, parse_log_record, split_log_records,
};
use std::rc::Rc;
use tracing::{debug, info};

/// Loads one commit with `git show`.
pub(crate) fn load_commit(
    commit: &Commit,
    repo: &Repository,
) -> Result<Rc<CommitData>, LoadError> {
    let hash = commit.hash();
    debug!(%hash, "loading commit");

    let pretty = format!("--pretty=format:{SHOW_FORMAT}");
    let hash_arg = hash.to_string();
    // Without quotePath, git still C-quotes paths containing `"`, `\`, or
    // control characters; parse_diff decodes those.
    let output = repo.call(&[
        "-c",
        "core.quotePath=false",
        "show",
        "--no-color",
        "--no-ext-diff",
        &pretty,
        &hash_arg,
    ])?;
    let record = parse_commit_record(&output)
        .map_err(|source| LoadError::Record { hash, source })?;
    apply_record(commit, record, repo.cache(), true)
}

/// Fetches only the diff of a commit that was loaded without one.
pub(crate) fn load_diff(
    commit: &Commit,
    repo: &Repository,
) -> Result<Rc<Diff>, LoadError> {
    let hash = commit.hash();
    debug!(%hash, "loading diff");

    let hash_arg = hash.to_string();
    let output = repo.call(&[
        "-c",
        "core.quotePath=false",
        "show",
        "--no-color",
        "--no-ext-diff",
        "--pretty=format:",
        &hash_arg,
    ])?;
    let diff = parse_diff(&output)
        .map_err(|source| LoadError::Diff { hash, source })?;
    let diff = Rc::new(diff);
    commit.set_diff(Rc::clone(&diff));
    Ok(diff)
}

/// Loads every commit reachable from `HEAD` with a single `git log`.
///
/// Commits that are already loaded keep their data; if `include_diffs` is
/// set and they lack a diff, the diff is filled in.
pub(crate) fn load_all(
    repo: &Repository,
    include_diffs: bool,
) -> Result<Vec<Rc<Commit>>, LoadError> {
    let pretty = format!("--pretty=format:{LOG_FORMAT}");
    let mut args = vec![
        "-c",
        "core.quotePath=false",
        "log",
        "--no-color",
        "--no-ext-diff",
        pretty.as_str(),
    ];
    if include_diffs {
        // --cc gives merges the same combined diff that `git show` prints.
        args.extend(["-p", "--cc"]);
    }
    info!(root = %repo.root(), include_diffs, "loading full history");
    let output = repo.call(&args)?;

    let cache = repo.cache();
    let mut commits = Vec::new();
    for raw in split_log_records(&output) {
        let (hash, record) =
            parse_log_record(raw).map_err(LoadError::BulkRecord)?;
        let commit = cache.commit(hash);
        if !commit.is_loaded() {
            apply_record(&commit, record, cache, include_diffs)?;
        } else if include_diffs && commit.loaded_diff().is_none() {
            let diff = parse_diff(&record.diff_text)
                .map_err(|source| LoadError::Diff { hash, source })?;
            commit.set_diff(Rc::new(diff));
        }
        commits.push(commit);
    }
    debug!(count = commits.len(), "loaded history");
    Ok(commits)
}

/// Wires a parsed record into the cache and marks `commit` loaded.
///
/// Parent placeholders are created before the diff is parsed, and the
/// diff is parsed before anything is registered with authors or parents, so
/// a failure leaves `commit` unloaded and unreferenced.
fn apply_record(
    commit: &Commit,
    record: CommitRecord,
    cache: &EntityCache,
    with_diff: bool,
) -> Result<Rc<CommitData>, LoadError> {
    let hash = commit.hash();

    let parents: Vec<Rc<Commit>> =
        record.parents.iter().map(|&parent| cache.commit(parent)).collect();

    let diff = if with_diff {
        let diff = parse_diff(&record.diff_text)
            .map_err(|source| LoadError::Diff { hash, source })?;
        Some(diff)
    } else {
        None
    };

    let author =
        cache.author_with_email(&record.author.name, &record.author.email);
    let committer = cache
        .author_with_email(&record.committer.name, &record.committer.email);
    author.register_commit(hash);
    for parent in &parents {
        parent.register_child(hash);
    }

    let data = CommitData {
        author,
        committer,
        author_date: record.author.date,
        commit_date: record.committer.date,
        title: record.title,
        message: record.message,
        parents: record.parents,
    };
    Ok(commit.set_loaded(data, diff))
}
