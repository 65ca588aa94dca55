// Copyright 2026 Oxide Computer Company

//! Commit authors.

use crate::{Commit, Repository};
use git_history::CommitHash;
use std::{
    cell::RefCell,
    collections::BTreeSet,
    hash::{Hash, Hasher},
    rc::Rc,
};

/// A person who authored or committed commits, identified by display name.
///
/// An author always has at least one known email address. Authors refer to
/// their commits by hash; use [`Author::commits`] to get the commits
/// themselves.
///
/// Two authors are equal if their names are equal.
#[derive(Debug)]
pub struct Author {
    name: String,
    emails: RefCell<BTreeSet<String>>,
    commits: RefCell<BTreeSet<CommitHash>>,
}

impl Author {
    /// Creates an author with one email address. `name` must already be
    /// trimmed.
    pub(crate) fn new(name: String, email: &str) -> Self {
        Author {
            name,
            emails: RefCell::new(BTreeSet::from([email.to_owned()])),
            commits: RefCell::new(BTreeSet::new()),
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the known email addresses, sorted.
    pub fn emails(&self) -> Vec<String> {
        self.emails.borrow().iter().cloned().collect()
    }

    /// Returns true if `email` is a known address of this author.
    pub fn has_email(&self, email: &str) -> bool {
        self.emails.borrow().contains(email)
    }

    /// Adds an email alias. Returns false if it was already known.
    pub fn register_email(&self, email: &str) -> bool {
        let mut emails = self.emails.borrow_mut();
        if emails.contains(email) {
            return false;
        }
        emails.insert(email.to_owned())
    }

    /// Records that this author authored the commit `hash`. Returns false
    /// if it was already recorded.
    pub fn register_commit(&self, hash: CommitHash) -> bool {
        self.commits.borrow_mut().insert(hash)
    }

    /// Returns the hashes of the commits registered so far.
    ///
    /// Commits register with their author when they are loaded, so this is
    /// only complete once every commit of interest is loaded (e.g. via
    /// [`Repository::load_all`]).
    pub fn commit_hashes(&self) -> Vec<CommitHash> {
        self.commits.borrow().iter().copied().collect()
    }

    /// Returns the number of commits registered so far.
    pub fn commit_count(&self) -> usize {
        self.commits.borrow().len()
    }

    /// Returns the commits registered so far, through the repository's
    /// cache.
    pub fn commits(&self, repo: &Repository) -> Vec<Rc<Commit>> {
        self.commits
            .borrow()
            .iter()
            .map(|&hash| repo.cache().commit(hash))
            .collect()
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Author {}

impl Hash for Author {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
