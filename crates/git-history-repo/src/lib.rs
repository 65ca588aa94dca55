// Copyright 2026 Oxide Computer Company

//! A lazily-loaded, identity-consistent view of a git repository's history.
//!
//! A [`Repository`] owns an [`EntityCache`] holding at most one [`Commit`]
//! per hash and one [`Author`] per name. Commits start out knowing only
//! their hash; the first accessor call runs `git show` once and parses its
//! output with [`git_history`]. Parents are created as unloaded
//! placeholders, so walking the graph only loads what is visited.
//!
//! For whole-history analyses, [`Repository::load_all`] loads every commit
//! with a single `git log`.
//!
//! Git is run as a subprocess, using the `$GIT` environment variable if
//! set. Failures are returned as errors and never terminate the process.
//!
//! # Examples
//!
//! ```no_run
//! use git_history::Diffable;
//! use git_history_repo::Repository;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = Repository::open(".")?;
//! let head = repo.head()?;
//! println!("{} by {}", head.title(&repo)?, head.author(&repo)?.name());
//!
//! for parent in head.parents(&repo)? {
//!     let changes = parent.changes(&repo)?;
//!     println!("{}: {} lines changed", parent.hash(), changes.changed_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! Sessions are single-threaded: commits and authors are shared through
//! `Rc`, so none of these types are `Send`. Use one session per thread.

#![deny(missing_docs)]
#![doc(html_root_url = "https://docs.rs/git-history-repo/0.1.0")]

mod author;
mod cache;
mod commit;
mod errors;
mod git;
mod loader;
mod repository;
#[cfg(test)]
mod testutils;

pub use author::Author;
pub use cache::EntityCache;
pub use commit::Commit;
pub use errors::{
    CacheError, ChangesError, CloneError, GitEnvError, LoadError, OpenError,
    ResolveError, RunError,
};
pub use git::{DecodePolicy, Git, GitRunner};
pub use repository::Repository;
