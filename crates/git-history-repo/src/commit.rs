// Copyright 2026 Oxide Computer Company

//! Lazily-loaded commits.

use crate::{Author, ChangesError, LoadError, Repository, loader};
use camino::Utf8Path;
use chrono::{DateTime, FixedOffset};
use git_history::{CommitHash, Diff, FileDiff};
use std::{
    cell::RefCell,
    collections::{BTreeSet, HashSet},
    hash::{Hash, Hasher},
    rc::Rc,
};

/// One revision of the repository.
///
/// A commit starts out *unloaded*: only its hash is known. The first call to
/// any accessor loads it by running git once; later calls reuse the loaded
/// data. Loading is all-or-nothing, so callers never see a partly populated
/// commit.
///
/// Obtain commits from a [`Repository`] (or its [`EntityCache`]), which
/// guarantees one instance per hash. Every accessor takes the repository
/// that owns the commit.
///
/// Two commits are equal if their hashes are equal.
///
/// [`EntityCache`]: crate::EntityCache
#[derive(Debug)]
pub struct Commit {
    hash: CommitHash,
    state: RefCell<CommitState>,
    children: RefCell<BTreeSet<CommitHash>>,
}

#[derive(Debug)]
enum CommitState {
    Unloaded,
    Loaded {
        data: Rc<CommitData>,
        /// `None` if the commit was bulk-loaded without diffs.
        diff: Option<Rc<Diff>>,
    },
}

/// The metadata of a loaded commit.
#[derive(Debug)]
pub(crate) struct CommitData {
    pub(crate) author: Rc<Author>,
    pub(crate) committer: Rc<Author>,
    pub(crate) author_date: DateTime<FixedOffset>,
    pub(crate) commit_date: DateTime<FixedOffset>,
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) parents: Vec<CommitHash>,
}

impl Commit {
    pub(crate) fn new(hash: CommitHash) -> Self {
        Commit {
            hash,
            state: RefCell::new(CommitState::Unloaded),
            children: RefCell::new(BTreeSet::new()),
        }
    }

    /// Returns the commit hash.
    pub fn hash(&self) -> CommitHash {
        self.hash
    }

    /// Returns true if the commit's metadata has been loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.borrow(), CommitState::Loaded { .. })
    }

    /// Loads the commit's metadata and diff from git.
    ///
    /// Does nothing if the commit is already loaded.
    pub fn load(&self, repo: &Repository) -> Result<(), LoadError> {
        self.data(repo).map(|_| ())
    }

    /// Drops the loaded data, returning the commit to the unloaded state.
    ///
    /// The next accessor call loads it again. Does nothing if the commit is
    /// not loaded.
    pub fn unload(&self) {
        *self.state.borrow_mut() = CommitState::Unloaded;
    }

    /// Returns the author.
    pub fn author(&self, repo: &Repository) -> Result<Rc<Author>, LoadError> {
        Ok(Rc::clone(&self.data(repo)?.author))
    }

    /// Returns the committer.
    pub fn committer(
        &self,
        repo: &Repository,
    ) -> Result<Rc<Author>, LoadError> {
        Ok(Rc::clone(&self.data(repo)?.committer))
    }

    /// Returns the author timestamp.
    pub fn author_date(
        &self,
        repo: &Repository,
    ) -> Result<DateTime<FixedOffset>, LoadError> {
        Ok(self.data(repo)?.author_date)
    }

    /// Returns the committer timestamp.
    pub fn commit_date(
        &self,
        repo: &Repository,
    ) -> Result<DateTime<FixedOffset>, LoadError> {
        Ok(self.data(repo)?.commit_date)
    }

    /// Returns the first line of the commit message.
    pub fn title(&self, repo: &Repository) -> Result<String, LoadError> {
        Ok(self.data(repo)?.title.clone())
    }

    /// Returns the commit message after the title, trimmed. Empty if the
    /// message has a single line.
    pub fn message(&self, repo: &Repository) -> Result<String, LoadError> {
        Ok(self.data(repo)?.message.clone())
    }

    /// Returns the parent commits, in order. Empty for a root commit.
    ///
    /// The parents are not loaded.
    pub fn parents(
        &self,
        repo: &Repository,
    ) -> Result<Vec<Rc<Commit>>, LoadError> {
        let data = self.data(repo)?;
        Ok(data.parents.iter().map(|&hash| repo.cache().commit(hash)).collect())
    }

    /// Returns the commits that have registered this commit as a parent.
    ///
    /// Children register while they load, so this is only complete once
    /// every possible child is loaded (e.g. via [`Repository::load_all`]).
    pub fn children(&self, repo: &Repository) -> Vec<Rc<Commit>> {
        self.children
            .borrow()
            .iter()
            .map(|&hash| repo.cache().commit(hash))
            .collect()
    }

    /// Returns every change made by this commit.
    pub fn changes(&self, repo: &Repository) -> Result<Rc<Diff>, LoadError> {
        self.load(repo)?;
        match self.loaded_diff() {
            Some(diff) => Ok(diff),
            None => loader::load_diff(self, repo),
        }
    }

    /// Returns the changes this commit made to `path`.
    ///
    /// Returns [`ChangesError::NoChanges`] if the commit did not touch
    /// `path`.
    pub fn changes_for(
        &self,
        repo: &Repository,
        path: impl AsRef<Utf8Path>,
    ) -> Result<FileDiff, ChangesError> {
        let path = path.as_ref();
        let diff = self.changes(repo)?;
        diff.file(path).cloned().ok_or_else(|| ChangesError::NoChanges {
            hash: self.hash,
            path: path.to_owned(),
        })
    }

    /// Returns true if this commit was authored strictly before `other`.
    pub fn authored_before(
        &self,
        other: &Commit,
        repo: &Repository,
    ) -> Result<bool, LoadError> {
        Ok(self.author_date(repo)? < other.author_date(repo)?)
    }

    /// Calls `f` on this commit and then on each of its ancestors.
    ///
    /// Ancestors reachable through several paths (after a merge) are visited
    /// once. Each visited commit is loaded to find its parents.
    pub fn for_each_parent<F>(
        self: &Rc<Self>,
        repo: &Repository,
        mut f: F,
    ) -> Result<(), LoadError>
    where
        F: FnMut(&Rc<Commit>),
    {
        let mut visited = HashSet::new();
        let mut stack = vec![Rc::clone(self)];
        while let Some(commit) = stack.pop() {
            if !visited.insert(commit.hash) {
                continue;
            }
            f(&commit);
            // Reversed so the first parent is visited first.
            stack.extend(commit.parents(repo)?.into_iter().rev());
        }
        Ok(())
    }

    pub(crate) fn data(
        &self,
        repo: &Repository,
    ) -> Result<Rc<CommitData>, LoadError> {
        match self.loaded_data() {
            Some(data) => Ok(data),
            None => loader::load_commit(self, repo),
        }
    }

    fn loaded_data(&self) -> Option<Rc<CommitData>> {
        match &*self.state.borrow() {
            CommitState::Loaded { data, .. } => Some(Rc::clone(data)),
            CommitState::Unloaded => None,
        }
    }

    pub(crate) fn loaded_diff(&self) -> Option<Rc<Diff>> {
        match &*self.state.borrow() {
            CommitState::Loaded { diff, .. } => diff.clone(),
            CommitState::Unloaded => None,
        }
    }

    pub(crate) fn set_loaded(
        &self,
        data: CommitData,
        diff: Option<Diff>,
    ) -> Rc<CommitData> {
        let data = Rc::new(data);
        *self.state.borrow_mut() = CommitState::Loaded {
            data: Rc::clone(&data),
            diff: diff.map(Rc::new),
        };
        data
    }

    /// Attaches a diff to a loaded commit. Does nothing if the commit has
    /// been unloaded in the meantime.
    pub(crate) fn set_diff(&self, new_diff: Rc<Diff>) {
        if let CommitState::Loaded { diff, .. } = &mut *self.state.borrow_mut() {
            *diff = Some(new_diff);
        }
    }

    pub(crate) fn register_child(&self, child: CommitHash) -> bool {
        self.children.borrow_mut().insert(child)
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Commit {}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}
