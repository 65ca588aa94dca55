// Copyright 2026 Oxide Computer Company

//! Integration tests for git-history-repo, run against real repositories.

mod helpers;
mod history;
mod open;
