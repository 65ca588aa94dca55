// Copyright 2026 Oxide Computer Company

//! Loading and walking a real history.

use crate::helpers::{commit_files, init_git_repo, setup_history};
use anyhow::Result;
use camino_tempfile::Utf8TempDir;
use git_history::Diffable;
use git_history_repo::{ChangesError, Repository, ResolveError};
use std::rc::Rc;

#[test]
fn test_commit_metadata() -> Result<()> {
    let fixture = setup_history()?;
    let repo = Repository::open(fixture.root())?;

    let head = repo.head()?;
    assert_eq!(head.hash().to_string(), fixture.merge);
    assert!(!head.is_loaded(), "resolving HEAD does not load it");
    assert_eq!(head.title(&repo)?, "Merge side");
    assert_eq!(head.message(&repo)?, "");

    let parents = head.parents(&repo)?;
    let parent_hashes: Vec<_> =
        parents.iter().map(|p| p.hash().to_string()).collect();
    assert_eq!(parent_hashes, [fixture.d.clone(), fixture.c.clone()]);

    let b = repo.commit(&fixture.b)?;
    assert_eq!(b.title(&repo)?, "Add line2");
    assert_eq!(b.message(&repo)?, "Also adds g.");
    let author = b.author(&repo)?;
    assert_eq!(author.name(), "Other Person");
    assert!(author.has_email("other@example.com"));
    assert_eq!(b.committer(&repo)?.name(), "Test User");
    assert_eq!(
        b.author_date(&repo)?.to_rfc3339(),
        "2020-01-02T10:00:00+00:00"
    );

    let c = repo.commit(&fixture.c)?;
    assert_eq!(
        c.commit_date(&repo)?.to_rfc3339(),
        "2020-01-03T10:00:00+01:00",
        "dates keep their recorded offset"
    );
    assert!(b.authored_before(&c, &repo)?);
    assert!(!c.authored_before(&b, &repo)?);

    Ok(())
}

#[test]
fn test_changes() -> Result<()> {
    let fixture = setup_history()?;
    let repo = Repository::open(fixture.root())?;

    let a = repo.commit(&fixture.a)?;
    let changes = a.changes(&repo)?;
    assert_eq!(changes.len(), 1);
    assert_eq!(changes.added_count(), 1);
    assert_eq!(changes.removed_count(), 0);

    let b = repo.commit(&fixture.b)?;
    let changes = b.changes(&repo)?;
    let paths: Vec<_> = changes.paths().map(|p| p.to_string()).collect();
    assert_eq!(paths, ["dir with space/g.txt", "f.txt"]);
    let f = b.changes_for(&repo, "f.txt")?;
    assert_eq!(f.hunks().len(), 1);
    assert_eq!(f.added_count(), 1);
    assert_eq!(f.removed_count(), 0);
    assert_eq!(f.hunks()[0].added(), ["line2"]);

    let d = repo.commit(&fixture.d)?;
    let f = d.changes_for(&repo, "f.txt")?;
    assert_eq!(f.added_count(), 1);
    assert_eq!(f.removed_count(), 1);
    assert_eq!(f.changed_count(), 2);

    let err = d.changes_for(&repo, "h.txt").unwrap_err();
    assert!(
        matches!(err, ChangesError::NoChanges { .. }),
        "unexpected error: {err:?}"
    );

    // A clean merge has an empty combined diff.
    let merge = repo.commit(&fixture.merge)?;
    assert!(merge.changes(&repo)?.is_empty());

    Ok(())
}

#[test]
fn test_graph_identity_and_walk() -> Result<()> {
    let fixture = setup_history()?;
    let repo = Repository::open(fixture.root())?;

    let b = repo.commit(&fixture.b)?;
    let resolved = repo.resolve("HEAD~2")?;
    assert!(Rc::ptr_eq(&b, &resolved), "one instance per hash");
    assert!(Rc::ptr_eq(&repo.resolve("light")?, &b));

    let mut visited = Vec::new();
    repo.head()?
        .for_each_parent(&repo, |commit| visited.push(commit.hash().to_string()))?;
    assert_eq!(
        visited,
        [
            fixture.merge.clone(),
            fixture.d.clone(),
            fixture.b.clone(),
            fixture.a.clone(),
            fixture.c.clone(),
        ],
        "depth-first, first parent first, each commit once"
    );

    let children: Vec<_> =
        b.children(&repo).iter().map(|c| c.hash().to_string()).collect();
    assert_eq!(children.len(), 2);
    assert!(children.contains(&fixture.c));
    assert!(children.contains(&fixture.d));

    Ok(())
}

#[test]
fn test_load_all() -> Result<()> {
    let fixture = setup_history()?;
    let repo = Repository::open(fixture.root())?;

    let commits = repo.load_all(false)?;
    assert_eq!(commits.len(), 5);
    assert_eq!(commits[0].hash().to_string(), fixture.merge);
    assert!(commits.iter().all(|c| c.is_loaded()));

    let names: Vec<_> =
        repo.authors().iter().map(|a| a.name().to_owned()).collect();
    assert_eq!(names, ["Other Person", "Test User"]);
    assert_eq!(repo.author("Test User", None)?.commit_count(), 4);
    let other = repo.author("Other Person", None)?;
    assert_eq!(other.commits(&repo), vec![repo.commit(&fixture.b)?]);

    // Diffs weren't loaded in bulk; they're fetched on first use.
    let b = repo.commit(&fixture.b)?;
    assert_eq!(b.changes(&repo)?.len(), 2);

    let with_diffs = Repository::open(fixture.root())?;
    let commits = with_diffs.load_all(true)?;
    let d = commits
        .iter()
        .find(|c| c.hash().to_string() == fixture.d)
        .expect("d is in the history");
    assert_eq!(d.changes(&with_diffs)?.changed_count(), 2);

    Ok(())
}

#[test]
fn test_refs() -> Result<()> {
    let fixture = setup_history()?;
    let repo = Repository::open(fixture.root())?;

    assert_eq!(repo.tags()?, ["light", "v1.0"]);
    assert_eq!(repo.tag("v1.0")?.hash().to_string(), fixture.a);
    assert_eq!(repo.tag("light")?.hash().to_string(), fixture.b);
    assert!(matches!(repo.tag("v2.0"), Err(ResolveError::UnknownTag { .. })));

    let roots = repo.initial_commits()?;
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].hash().to_string(), fixture.a);

    let history: Vec<_> = repo
        .list_history("f.txt")?
        .iter()
        .map(|c| c.hash().to_string())
        .collect();
    assert_eq!(history, [fixture.d.clone(), fixture.b.clone(), fixture.a.clone()]);

    Ok(())
}

#[test]
fn test_read_file_at() -> Result<()> {
    let fixture = setup_history()?;
    let repo = Repository::open(fixture.root())?;

    assert_eq!(
        repo.read_file_at("f.txt", &fixture.a)?.as_deref(),
        Some("line1\n")
    );
    assert_eq!(repo.read_file_at("h.txt", &fixture.a)?, None);
    assert!(repo.path_exists_at("dir with space/g.txt", "HEAD")?);
    assert!(!repo.path_exists_at("h.txt", "v1.0")?);

    Ok(())
}

#[test]
fn test_checkout_resets_cache() -> Result<()> {
    let fixture = setup_history()?;
    let mut repo = Repository::open(fixture.root())?;

    let head = repo.head()?;
    head.load(&repo)?;
    assert!(repo.has_commit(&fixture.merge));

    repo.checkout(&fixture.a)?;
    assert!(!repo.has_commit(&fixture.merge));
    assert!(repo.authors().is_empty());
    assert_eq!(repo.head()?.hash().to_string(), fixture.a);

    Ok(())
}

#[test]
fn test_changes_for_escaped_paths() -> Result<()> {
    let temp = Utf8TempDir::with_prefix("git-history-repo-")?;
    let root = temp.path();
    init_git_repo(root)?;
    let hash = commit_files(
        root,
        &[("caf\u{e9}.txt", "x\n"), ("q\"uote.txt", "y\n")],
        &["-m", "Add awkward names"],
        "2020-01-01 10:00:00 +0000",
    )?;

    let repo = Repository::open(root)?;
    let commit = repo.commit(&hash)?;
    let paths: Vec<_> =
        commit.changes(&repo)?.paths().map(|p| p.to_string()).collect();
    assert_eq!(paths, ["caf\u{e9}.txt", "q\"uote.txt"]);
    assert_eq!(commit.changes_for(&repo, "caf\u{e9}.txt")?.added_count(), 1);
    assert_eq!(
        repo.read_file_at("caf\u{e9}.txt", &hash)?.as_deref(),
        Some("x\n"),
        "diff paths match the paths git reads files by"
    );

    let bulk = Repository::open(root)?;
    let commits = bulk.load_all(true)?;
    assert!(commits[0].changes_for(&bulk, "q\"uote.txt").is_ok());

    Ok(())
}

#[test]
fn test_message_quoting_a_diff() -> Result<()> {
    let temp = Utf8TempDir::with_prefix("git-history-repo-")?;
    let root = temp.path();
    init_git_repo(root)?;
    let hash = commit_files(
        root,
        &[("a.txt", "a\n")],
        &["-m", "Quote a diff", "-m", "diff --git a/x b/x\nbody line"],
        "2020-01-01 10:00:00 +0000",
    )?;

    let repo = Repository::open(root)?;
    let commit = repo.commit(&hash)?;
    assert_eq!(commit.message(&repo)?, "diff --git a/x b/x\nbody line");
    let paths: Vec<_> =
        commit.changes(&repo)?.paths().map(|p| p.to_string()).collect();
    assert_eq!(paths, ["a.txt"]);

    let bulk = Repository::open(root)?;
    let commits = bulk.load_all(true)?;
    assert_eq!(commits[0].message(&bulk)?, "diff --git a/x b/x\nbody line");
    assert_eq!(commits[0].changes(&bulk)?.len(), 1);

    Ok(())
}
