// Copyright 2026 Oxide Computer Company

//! Helpers for building repositories with a known history.

use anyhow::{Result, bail};
use camino::Utf8Path;
use camino_tempfile::Utf8TempDir;
use std::{fs, process::Command};

/// Returns a `Command` for git, respecting the `$GIT` environment variable.
pub fn git_command() -> Command {
    let bin = std::env::var("GIT").unwrap_or_else(|_| "git".to_string());
    Command::new(bin)
}

/// Runs git in `repo_root`, with author and committer dates set to `date`
/// if given. Returns stdout, trimmed.
pub fn git(
    repo_root: &Utf8Path,
    args: &[&str],
    date: Option<&str>,
) -> Result<String> {
    let mut command = git_command();
    command.args(args).current_dir(repo_root);
    if let Some(date) = date {
        command
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date);
    }
    let output = command.output()?;
    if !output.status.success() {
        bail!(
            "git {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(String::from_utf8(output.stdout)?.trim().to_string())
}

/// Initializes a git repository and configures the user.
pub fn init_git_repo(repo_root: &Utf8Path) -> Result<()> {
    git(repo_root, &["init", "--quiet"], None)?;
    git(repo_root, &["config", "user.email", "test@example.com"], None)?;
    git(repo_root, &["config", "user.name", "Test User"], None)?;
    git(repo_root, &["config", "commit.gpgsign", "false"], None)?;
    git(repo_root, &["config", "tag.gpgsign", "false"], None)?;
    Ok(())
}

/// Writes `files` (path, contents) and commits everything. Returns the
/// commit hash.
pub fn commit_files(
    repo_root: &Utf8Path,
    files: &[(&str, &str)],
    commit_args: &[&str],
    date: &str,
) -> Result<String> {
    for (path, contents) in files {
        let path = repo_root.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
    }
    git(repo_root, &["add", "-A"], None)?;

    let mut args = vec!["commit", "--quiet"];
    args.extend_from_slice(commit_args);
    git(repo_root, &args, Some(date))?;
    git(repo_root, &["rev-parse", "HEAD"], None)
}

/// A repository with a merge in its history:
///
/// ```text
/// a -- b -- d -- merge
///       \        /
///        c -----
/// ```
///
/// `b` is by "Other Person"; everything else is by "Test User". `a` has the
/// annotated tag `v1.0` and `b` the lightweight tag `light`.
pub struct Fixture {
    pub temp: Utf8TempDir,
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    pub merge: String,
}

impl Fixture {
    pub fn root(&self) -> &Utf8Path {
        self.temp.path()
    }
}

pub fn setup_history() -> Result<Fixture> {
    let temp = Utf8TempDir::with_prefix("git-history-repo-")?;
    let root = temp.path();
    init_git_repo(root)?;

    let a = commit_files(
        root,
        &[("f.txt", "line1\n")],
        &["-m", "Initial commit"],
        "2020-01-01 10:00:00 +0000",
    )?;
    git(root, &["tag", "-a", "v1.0", "-m", "Version 1.0"], None)?;

    let b = commit_files(
        root,
        &[("f.txt", "line1\nline2\n"), ("dir with space/g.txt", "g\n")],
        &[
            "-m",
            "Add line2",
            "-m",
            "Also adds g.",
            "--author",
            "Other Person <other@example.com>",
        ],
        "2020-01-02 10:00:00 +0000",
    )?;
    git(root, &["tag", "light"], None)?;

    let main = git(root, &["rev-parse", "--abbrev-ref", "HEAD"], None)?;
    git(root, &["checkout", "--quiet", "-b", "side"], None)?;
    let c = commit_files(
        root,
        &[("h.txt", "h\n")],
        &["-m", "Add h"],
        "2020-01-03 10:00:00 +0100",
    )?;

    git(root, &["checkout", "--quiet", &main], None)?;
    let d = commit_files(
        root,
        &[("f.txt", "LINE1\nline2\n")],
        &["-m", "Shout line1"],
        "2020-01-04 10:00:00 +0000",
    )?;

    git(
        root,
        &["merge", "--quiet", "--no-ff", "-m", "Merge side", "side"],
        Some("2020-01-05 10:00:00 +0000"),
    )?;
    let merge = git(root, &["rev-parse", "HEAD"], None)?;

    Ok(Fixture { temp, a, b, c, d, merge })
}
