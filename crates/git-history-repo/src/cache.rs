// Copyright 2026 Oxide Computer Company

//! The registry of commits and authors for one repository session.

use crate::{Author, CacheError, Commit};
use git_history::CommitHash;
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};
use tracing::trace;

/// Owns every [`Commit`] and [`Author`] of a repository session, keyed by
/// commit hash and author name.
///
/// There is at most one live instance per key: looking up the same hash
/// twice returns the same `Rc`. Commits are created unloaded on first
/// lookup, which is how the commit graph is built lazily.
///
/// The cache is single-threaded shared state. It is neither `Send` nor
/// `Sync`, and reentrant use from multiple threads is not supported. To share
/// one across threads, wrap the whole session in a mutex or an actor and
/// make commit loading single-flight per hash.
#[derive(Debug, Default)]
pub struct EntityCache {
    commits: RefCell<HashMap<CommitHash, Rc<Commit>>>,
    authors: RefCell<BTreeMap<String, Rc<Author>>>,
    refs: RefCell<Refs>,
}

/// Resolved refs, cached alongside the entities they point to.
#[derive(Debug, Default)]
pub(crate) struct Refs {
    pub(crate) head: Option<CommitHash>,
    pub(crate) tags: Option<BTreeMap<String, CommitHash>>,
    pub(crate) initial_commits: Option<Vec<CommitHash>>,
}

impl EntityCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the commit for `hash`, creating an unloaded one if this is
    /// the first lookup.
    ///
    /// Returns an error if `hash` is empty or is not a full commit hash.
    pub fn get_or_create_commit(
        &self,
        hash: &str,
    ) -> Result<Rc<Commit>, CacheError> {
        let parsed = hash.parse().map_err(|source| CacheError::InvalidHash {
            value: hash.to_owned(),
            source,
        })?;
        Ok(self.commit(parsed))
    }

    /// Returns the commit for `hash`, creating an unloaded one if this is
    /// the first lookup.
    pub fn commit(&self, hash: CommitHash) -> Rc<Commit> {
        let mut commits = self.commits.borrow_mut();
        Rc::clone(commits.entry(hash).or_insert_with(|| {
            trace!(%hash, "creating unloaded commit");
            Rc::new(Commit::new(hash))
        }))
    }

    /// Returns true if a commit with this hash is in the cache.
    ///
    /// Malformed hashes are never in the cache.
    pub fn has_commit(&self, hash: &str) -> bool {
        hash.parse::<CommitHash>()
            .is_ok_and(|hash| self.commits.borrow().contains_key(&hash))
    }

    /// Returns the number of cached commits, loaded or not.
    pub fn commit_count(&self) -> usize {
        self.commits.borrow().len()
    }

    /// Returns the author named `name` (trimmed).
    ///
    /// If the author is unknown, `email` is required to create it; without
    /// one this returns [`CacheError::UnknownAuthor`]. If the author is
    /// known, `email` is added as an alias.
    pub fn get_or_create_author(
        &self,
        name: &str,
        email: Option<&str>,
    ) -> Result<Rc<Author>, CacheError> {
        let name = name.trim();
        match email {
            Some(email) => Ok(self.author_with_email(name, email)),
            None => self.authors.borrow().get(name).cloned().ok_or_else(|| {
                CacheError::UnknownAuthor { name: name.to_owned() }
            }),
        }
    }

    /// Returns the author named `name` (trimmed), creating it with `email`
    /// or adding `email` as an alias.
    pub(crate) fn author_with_email(&self, name: &str, email: &str) -> Rc<Author> {
        let name = name.trim();
        let mut authors = self.authors.borrow_mut();
        if let Some(author) = authors.get(name) {
            author.register_email(email);
            return Rc::clone(author);
        }
        trace!(name, email, "registering new author");
        let author = Rc::new(Author::new(name.to_owned(), email));
        authors.insert(name.to_owned(), Rc::clone(&author));
        author
    }

    /// Returns every known author, sorted by name.
    pub fn authors(&self) -> Vec<Rc<Author>> {
        self.authors.borrow().values().cloned().collect()
    }

    /// Drops every commit, author, and resolved ref.
    ///
    /// Handles obtained earlier stay valid but are no longer part of the
    /// cache: a later lookup of the same hash creates a new instance.
    pub fn clear(&self) {
        self.commits.borrow_mut().clear();
        self.authors.borrow_mut().clear();
        *self.refs.borrow_mut() = Refs::default();
    }

    pub(crate) fn refs(&self) -> &RefCell<Refs> {
        &self.refs
    }
}
