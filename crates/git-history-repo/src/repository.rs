// Copyright 2026 Oxide Computer Company

//! Repository sessions: the context that owns the git runner and the cache.

use crate::{
    Author, CacheError, CloneError, Commit, DecodePolicy, EntityCache, Git,
    GitRunner, LoadError, OpenError, ResolveError, RunError,
    git::check_repo_root, loader,
};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use git_history::{CommitHash, parse_hash_lines};
use std::{collections::BTreeMap, rc::Rc};
use tracing::{debug, info};

/// A session over one git repository.
///
/// The session owns the [`EntityCache`] that every [`Commit`] and
/// [`Author`] lives in, and the [`GitRunner`] used to load them. Commit
/// accessors take the session as an argument.
///
/// Selecting a different root ([`set_root`](Self::set_root)) or checking out
/// a different revision ([`checkout`](Self::checkout)) clears the cache,
/// since cached entities may no longer match the working directory.
///
/// A session is single-threaded, and invocations of git are not serialized
/// across sessions that share a working directory.
#[derive(Debug)]
pub struct Repository {
    root: Utf8PathBuf,
    runner: Box<dyn GitRunner>,
    decode: DecodePolicy,
    cache: EntityCache,
}

impl Repository {
    /// Opens the repository at `root` using the git binary from `$GIT` (or
    /// `git`).
    ///
    /// `root` must be the repository root: a directory containing `.git`.
    /// Use `"."` for the current directory.
    pub fn open(root: impl Into<Utf8PathBuf>) -> Result<Self, OpenError> {
        let root = root.into();
        check_repo_root(&root)?;
        let git = Git::from_env()?;
        debug!(%root, binary = git.binary(), "opened repository");
        Ok(Self::with_runner(root, git))
    }

    /// Clones `address` into `loc/<name>` and opens the clone. `<name>` is
    /// the directory `git clone` would pick: the last component of
    /// `address`, without a `.git` suffix.
    ///
    /// If `loc/<name>` is already a directory, cloning is skipped; with
    /// `update`, the existing clone is fast-forwarded with `git pull` first.
    /// `loc` is created if it does not exist.
    pub fn clone(
        loc: impl AsRef<Utf8Path>,
        address: &str,
        update: bool,
    ) -> Result<Self, CloneError> {
        let loc = loc.as_ref();
        let name = clone_dir_name(address).ok_or_else(|| {
            CloneError::InvalidAddress { address: address.to_owned() }
        })?;
        fs::create_dir_all(loc).map_err(|source| CloneError::CreateDir {
            path: loc.to_owned(),
            source,
        })?;

        let git = Git::from_env()?;
        let path = loc.join(name);
        if !path.is_dir() {
            info!(address, %path, "cloning repository");
            git.run(&["clone", "--quiet", "--", address, name], loc)?;
        } else if update {
            info!(%path, "updating existing clone");
            git.run(&["pull", "--quiet", "--ff-only"], &path)?;
        } else {
            debug!(%path, "clone already exists");
        }
        Ok(Self::open(path)?)
    }

    /// Creates a session that runs git through `runner`, without checking
    /// `root`.
    pub fn with_runner(
        root: impl Into<Utf8PathBuf>,
        runner: impl GitRunner + 'static,
    ) -> Self {
        Repository {
            root: root.into(),
            runner: Box::new(runner),
            decode: DecodePolicy::default(),
            cache: EntityCache::new(),
        }
    }

    /// Sets how git output is decoded.
    pub fn with_decode_policy(mut self, decode: DecodePolicy) -> Self {
        self.decode = decode;
        self
    }

    /// Returns the repository root.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Returns the decode policy.
    pub fn decode_policy(&self) -> DecodePolicy {
        self.decode
    }

    /// Returns the cache of commits and authors.
    pub fn cache(&self) -> &EntityCache {
        &self.cache
    }

    /// Switches to the repository at `root` and clears the cache.
    ///
    /// On error the session is unchanged.
    pub fn set_root(
        &mut self,
        root: impl Into<Utf8PathBuf>,
    ) -> Result<(), OpenError> {
        let root = root.into();
        check_repo_root(&root)?;
        self.root = root;
        self.reset();
        Ok(())
    }

    /// Runs `git checkout <revision>` and clears the cache.
    pub fn checkout(&mut self, revision: &str) -> Result<(), RunError> {
        self.call(&["checkout", "--quiet", revision])?;
        self.reset();
        Ok(())
    }

    /// Clears the cache.
    pub fn reset(&mut self) {
        info!(
            root = %self.root,
            commits = self.cache.commit_count(),
            "clearing commit cache"
        );
        self.cache.clear();
    }

    /// Runs git with `args` in the repository root and returns its output
    /// as text.
    pub fn call(&self, args: &[&str]) -> Result<String, RunError> {
        debug!(root = %self.root, ?args, "running git");
        let stdout = self.runner.run(args, &self.root)?;
        self.decode.decode(stdout, args)
    }

    /// Returns the commit with the full hash `hash`, unloaded if this is the
    /// first lookup.
    pub fn commit(&self, hash: &str) -> Result<Rc<Commit>, CacheError> {
        self.cache.get_or_create_commit(hash)
    }

    /// Returns true if the commit is already in the cache.
    pub fn has_commit(&self, hash: &str) -> bool {
        self.cache.has_commit(hash)
    }

    /// Returns the author named `name`; see
    /// [`EntityCache::get_or_create_author`].
    pub fn author(
        &self,
        name: &str,
        email: Option<&str>,
    ) -> Result<Rc<Author>, CacheError> {
        self.cache.get_or_create_author(name, email)
    }

    /// Returns every author known so far.
    ///
    /// Authors are discovered as commits load; call
    /// [`load_all`](Self::load_all) first for a complete list.
    pub fn authors(&self) -> Vec<Rc<Author>> {
        self.cache.authors()
    }

    /// Loads every commit reachable from `HEAD` with a single git
    /// invocation, returning them newest first.
    ///
    /// This is much faster than loading commits one at a time. With
    /// `include_diffs`, every diff is held in memory at once, which can be a
    /// lot for large histories; without it, diffs are fetched per commit on
    /// first use.
    pub fn load_all(
        &self,
        include_diffs: bool,
    ) -> Result<Vec<Rc<Commit>>, LoadError> {
        loader::load_all(self, include_diffs)
    }

    /// Resolves a revision (branch, tag, abbreviated hash, `HEAD~2`, ...)
    /// to a commit.
    pub fn resolve(&self, revision: &str) -> Result<Rc<Commit>, ResolveError> {
        let revspec = format!("{revision}^{{commit}}");
        let output =
            self.call(&["rev-parse", "--verify", "--quiet", &revspec])?;
        let hash = parse_single_hash(&output)?;
        Ok(self.cache.commit(hash))
    }

    /// Returns the commit at `HEAD`.
    pub fn head(&self) -> Result<Rc<Commit>, ResolveError> {
        if let Some(hash) = self.cache.refs().borrow().head {
            return Ok(self.cache.commit(hash));
        }
        let output = self.call(&["rev-parse", "HEAD"])?;
        let hash = parse_single_hash(&output)?;
        self.cache.refs().borrow_mut().head = Some(hash);
        Ok(self.cache.commit(hash))
    }

    /// Returns the commits without parents that are reachable from `HEAD`.
    ///
    /// A history can have several roots, e.g. after merging unrelated
    /// histories.
    pub fn initial_commits(&self) -> Result<Vec<Rc<Commit>>, ResolveError> {
        let cached = self.cache.refs().borrow().initial_commits.clone();
        let hashes = match cached {
            Some(hashes) => hashes,
            None => {
                let output =
                    self.call(&["rev-list", "--max-parents=0", "HEAD"])?;
                let hashes = parse_hashes(&output)?;
                self.cache.refs().borrow_mut().initial_commits =
                    Some(hashes.clone());
                hashes
            }
        };
        Ok(self.commits_for(&hashes))
    }

    /// Returns the names of all tags, sorted.
    pub fn tags(&self) -> Result<Vec<String>, ResolveError> {
        Ok(self.tag_map()?.into_keys().collect())
    }

    /// Returns the commit a tag points to.
    pub fn tag(&self, name: &str) -> Result<Rc<Commit>, ResolveError> {
        match self.tag_map()?.get(name) {
            Some(&hash) => Ok(self.cache.commit(hash)),
            None => Err(ResolveError::UnknownTag { name: name.to_owned() }),
        }
    }

    /// Returns every tag with the commit it points to.
    ///
    /// Sort the result chronologically with
    /// [`Commit::authored_before`] if needed.
    pub fn tags_by_commit(
        &self,
    ) -> Result<Vec<(Rc<Commit>, String)>, ResolveError> {
        Ok(self
            .tag_map()?
            .into_iter()
            .map(|(name, hash)| (self.cache.commit(hash), name))
            .collect())
    }

    /// Returns the commits that changed `path`, newest first.
    ///
    /// The commits are not loaded.
    pub fn list_history(
        &self,
        path: impl AsRef<Utf8Path>,
    ) -> Result<Vec<Rc<Commit>>, ResolveError> {
        let output = self.call(&[
            "log",
            "--pretty=format:%H",
            "--",
            path.as_ref().as_str(),
        ])?;
        Ok(self.commits_for(&parse_hashes(&output)?))
    }

    /// Returns the contents of `path` at `revision`, or `None` if the path
    /// does not exist there.
    pub fn read_file_at(
        &self,
        path: impl AsRef<Utf8Path>,
        revision: &str,
    ) -> Result<Option<String>, RunError> {
        let object = format!("{revision}:{}", path.as_ref());
        if !self.object_exists(&object)? {
            return Ok(None);
        }
        self.call(&["cat-file", "blob", &object]).map(Some)
    }

    /// Returns true if `path` exists at `revision`.
    pub fn path_exists_at(
        &self,
        path: impl AsRef<Utf8Path>,
        revision: &str,
    ) -> Result<bool, RunError> {
        self.object_exists(&format!("{revision}:{}", path.as_ref()))
    }

    /// Runs `git cat-file -e`, which exits unsuccessfully for a missing
    /// object.
    fn object_exists(&self, object: &str) -> Result<bool, RunError> {
        match self.call(&["cat-file", "-e", object]) {
            Ok(_) => Ok(true),
            Err(err) if err.is_nonzero_exit() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn tag_map(&self) -> Result<BTreeMap<String, CommitHash>, ResolveError> {
        if let Some(tags) = &self.cache.refs().borrow().tags {
            return Ok(tags.clone());
        }
        // show-ref exits unsuccessfully when there are no tags.
        let output = match self.call(&["show-ref", "--tags", "--dereference"]) {
            Ok(output) => output,
            Err(err) if err.is_nonzero_exit() => String::new(),
            Err(err) => return Err(err.into()),
        };
        let tags = parse_show_ref_tags(&output)?;
        self.cache.refs().borrow_mut().tags = Some(tags.clone());
        Ok(tags)
    }

    fn commits_for(&self, hashes: &[CommitHash]) -> Vec<Rc<Commit>> {
        hashes.iter().map(|&hash| self.cache.commit(hash)).collect()
    }
}

/// Returns the directory name `git clone` derives from `address`, e.g. `y`
/// for `https://host/x/y.git`, `git@host:y.git`, or `/srv/y/.git`.
fn clone_dir_name(address: &str) -> Option<&str> {
    let trimmed = address.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/.git").unwrap_or(trimmed);
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last.strip_suffix(".git").unwrap_or(last);
    (!name.is_empty() && name != "." && name != "..").then_some(name)
}

fn parse_single_hash(output: &str) -> Result<CommitHash, ResolveError> {
    let trimmed = output.trim();
    trimmed.parse().map_err(|source| ResolveError::InvalidOutput {
        output: trimmed.to_owned(),
        source,
    })
}

fn parse_hashes(output: &str) -> Result<Vec<CommitHash>, ResolveError> {
    parse_hash_lines(output).map_err(|source| ResolveError::InvalidOutput {
        output: output.to_owned(),
        source,
    })
}

/// Parses `git show-ref --tags --dereference` output into tag names and
/// the commits they point to.
///
/// Annotated tags are listed twice: once for the tag object, and once with
/// a `^{}` suffix for the commit it peels to. The peeled line wins.
fn parse_show_ref_tags(
    output: &str,
) -> Result<BTreeMap<String, CommitHash>, ResolveError> {
    let mut tags = BTreeMap::new();
    for line in output.lines() {
        let Some((hash, name)) = line.split_once(' ') else {
            continue;
        };
        let Some(name) = name.strip_prefix("refs/tags/") else {
            continue;
        };
        let hash: CommitHash =
            hash.parse().map_err(|source| ResolveError::InvalidOutput {
                output: line.to_owned(),
                source,
            })?;
        match name.strip_suffix("^{}") {
            Some(peeled) => {
                tags.insert(peeled.to_owned(), hash);
            }
            None => {
                tags.entry(name.to_owned()).or_insert(hash);
            }
        }
    }
    Ok(tags)
}
