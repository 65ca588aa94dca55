// Copyright 2026 Oxide Computer Company

//! Opening repositories and handling git failures.

use crate::helpers::{commit_files, init_git_repo, setup_history};
use anyhow::Result;
use camino_tempfile::Utf8TempDir;
use git_history_repo::{OpenError, Repository, ResolveError, RunError};
use std::fs;

#[test]
fn test_open_errors() -> Result<()> {
    let temp = Utf8TempDir::with_prefix("git-history-repo-")?;

    let err = Repository::open("").unwrap_err();
    assert!(matches!(err, OpenError::EmptyRoot), "unexpected error: {err:?}");

    let err = Repository::open(temp.path()).unwrap_err();
    assert!(
        matches!(err, OpenError::NotARepository { .. }),
        "unexpected error: {err:?}"
    );

    let err = Repository::open(temp.path().join("missing")).unwrap_err();
    assert!(
        matches!(err, OpenError::PathNotFound { .. }),
        "unexpected error: {err:?}"
    );

    Ok(())
}

#[test]
fn test_set_root() -> Result<()> {
    let fixture = setup_history()?;
    let mut repo = Repository::open(fixture.root())?;
    repo.head()?.load(&repo)?;

    let not_a_repo = Utf8TempDir::with_prefix("git-history-repo-")?;
    let err = repo.set_root(not_a_repo.path()).unwrap_err();
    assert!(matches!(err, OpenError::NotARepository { .. }));
    assert_eq!(repo.root(), fixture.root(), "failed switch keeps the root");
    assert!(repo.has_commit(&fixture.merge), "and keeps the cache");

    let other = Utf8TempDir::with_prefix("git-history-repo-")?;
    init_git_repo(other.path())?;
    let only = commit_files(
        other.path(),
        &[("README", "hello\n")],
        &["-m", "Only commit"],
        "2021-06-01 12:00:00 +0000",
    )?;
    repo.set_root(other.path())?;
    assert!(!repo.has_commit(&fixture.merge), "switching clears the cache");
    assert_eq!(repo.head()?.hash().to_string(), only);
    assert!(repo.tags()?.is_empty(), "no tags is not an error");

    Ok(())
}

#[test]
fn test_unknown_revision() -> Result<()> {
    let fixture = setup_history()?;
    let repo = Repository::open(fixture.root())?;

    let err = repo.resolve("no-such-branch").unwrap_err();
    assert!(
        matches!(&err, ResolveError::Run(run) if run.is_nonzero_exit()),
        "unexpected error: {err:?}"
    );

    // A well-formed hash that isn't in the repository loads with an error,
    // and the process carries on.
    let missing = repo.commit(&"0".repeat(40))?;
    let err = missing.load(&repo).unwrap_err();
    assert!(
        matches!(err, git_history_repo::LoadError::Run(RunError::Failed { .. })),
        "unexpected error: {err:?}"
    );
    assert!(!missing.is_loaded());

    Ok(())
}

#[test]
fn test_clone() -> Result<()> {
    let temp = Utf8TempDir::with_prefix("git-history-clone-")?;
    let origin = temp.path().join("origin");
    fs::create_dir(&origin)?;
    init_git_repo(&origin)?;
    let first = commit_files(
        &origin,
        &[("a.txt", "a\n")],
        &["-m", "First"],
        "2021-01-01 10:00:00 +0000",
    )?;
    let address = format!("file://{origin}");
    let loc = temp.path().join("clones");

    let repo = Repository::clone(&loc, &address, false)?;
    assert_eq!(repo.root(), loc.join("origin").as_path());
    assert_eq!(repo.head()?.hash().to_string(), first);
    assert_eq!(repo.head()?.title(&repo)?, "First");

    let second = commit_files(
        &origin,
        &[("a.txt", "a\nb\n")],
        &["-m", "Second"],
        "2021-01-02 10:00:00 +0000",
    )?;
    let existing = Repository::clone(&loc, &address, false)?;
    assert_eq!(
        existing.head()?.hash().to_string(),
        first,
        "an existing clone is reused without updating"
    );

    let updated = Repository::clone(&loc, &address, true)?;
    assert_eq!(updated.head()?.hash().to_string(), second);

    Ok(())
}

#[test]
fn test_open_worktree() -> Result<()> {
    let fixture = setup_history()?;
    let temp = Utf8TempDir::with_prefix("git-history-worktree-")?;
    let worktree = temp.path().join("wt");
    crate::helpers::git(
        fixture.root(),
        &["worktree", "add", "--quiet", "--detach", worktree.as_str(), "v1.0"],
        None,
    )?;
    assert!(fs::metadata(worktree.join(".git"))?.is_file());

    let repo = Repository::open(&worktree)?;
    assert_eq!(repo.head()?.hash().to_string(), fixture.a);

    Ok(())
}
