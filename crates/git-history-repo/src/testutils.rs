// Copyright 2026 Oxide Computer Company

//! A scripted [`GitRunner`] for unit tests.

use crate::{GitRunner, RunError};
use camino::Utf8Path;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Replies to known argument lists with canned stdout, and fails like a
/// nonzero git exit for anything else. Clones share their responses and
/// call log, so a test can keep one clone after handing another to a
/// `Repository`.
#[derive(Clone, Debug, Default)]
pub(crate) struct StubGit {
    inner: Rc<RefCell<StubInner>>,
}

#[derive(Debug, Default)]
struct StubInner {
    responses: HashMap<Vec<String>, String>,
    calls: Vec<Vec<String>>,
}

impl StubGit {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(&self, args: Vec<String>, stdout: String) {
        self.inner.borrow_mut().responses.insert(args, stdout);
    }

    pub(crate) fn invocations(&self) -> usize {
        self.inner.borrow().calls.len()
    }

    pub(crate) fn calls(&self) -> Vec<Vec<String>> {
        self.inner.borrow().calls.clone()
    }
}

impl GitRunner for StubGit {
    fn run(
        &self,
        args: &[&str],
        working_dir: &Utf8Path,
    ) -> Result<Vec<u8>, RunError> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(args.clone());
        match inner.responses.get(&args) {
            Some(stdout) => Ok(stdout.clone().into_bytes()),
            None => Err(RunError::Failed {
                binary_path: "stub-git".to_owned(),
                args,
                working_dir: working_dir.to_owned(),
                exit_status: "exit status: 128".to_owned(),
                stderr: "fatal: no canned response".to_owned(),
            }),
        }
    }
}
