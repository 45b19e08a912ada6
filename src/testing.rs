//! in-memory repository and mock expectations for exercising the commit workflow

use crate::claude::MockBackend;
use crate::git::Vcs;
use crate::prompt::MockPrompter;
use anyhow::{Result, bail};
use mockall::Sequence;
use std::cell::RefCell;

#[derive(Debug, Default)]
pub struct GitState {
    pub changed: Vec<String>,
    pub staged: Vec<String>,
    pub stage_calls: Vec<Vec<String>>,
    pub diff_calls: Vec<Vec<String>>,
    pub commits: Vec<String>,
    pub pushes: usize,
}

/// a repository whose state lives in memory
#[derive(Debug)]
pub struct FakeGit {
    pub state: RefCell<GitState>,
    pub diff_text: String,
    /// staging silently does nothing, like a hook that unstages everything
    pub staging_is_noop: bool,
    pub fail_commit: bool,
    pub fail_push: bool,
    pub commit_output: String,
    pub push_output: String,
}

impl FakeGit {
    pub fn new(changed: &[&str], staged: &[&str]) -> Self {
        Self {
            state: RefCell::new(GitState {
                changed: changed.iter().map(ToString::to_string).collect(),
                staged: staged.iter().map(ToString::to_string).collect(),
                ..GitState::default()
            }),
            diff_text: "+line".into(),
            staging_is_noop: false,
            fail_commit: false,
            fail_push: false,
            commit_output: "[main 1a2b3c4] committed".into(),
            push_output: String::new(),
        }
    }

    pub fn commits(&self) -> Vec<String> {
        self.state.borrow().commits.clone()
    }

    pub fn pushes(&self) -> usize {
        self.state.borrow().pushes
    }

    pub fn staged(&self) -> Vec<String> {
        self.state.borrow().staged.clone()
    }

    pub fn diff_calls(&self) -> Vec<Vec<String>> {
        self.state.borrow().diff_calls.clone()
    }

    pub fn stage_calls(&self) -> Vec<Vec<String>> {
        self.state.borrow().stage_calls.clone()
    }
}

impl Vcs for FakeGit {
    fn assert_repo(&self) -> Result<()> {
        Ok(())
    }

    fn changed_files(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().changed.clone())
    }

    fn staged_files(&self) -> Result<Vec<String>> {
        Ok(self.state.borrow().staged.clone())
    }

    fn stage_files(&self, files: &[String]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.stage_calls.push(files.to_vec());
        if self.staging_is_noop {
            return Ok(());
        }
        for file in files {
            if !state.changed.contains(file) {
                bail!("{file}: not a changed file");
            }
            if !state.staged.contains(file) {
                state.staged.push(file.clone());
            }
        }
        Ok(())
    }

    fn diff(&self, files: &[String]) -> Result<String> {
        self.state.borrow_mut().diff_calls.push(files.to_vec());
        Ok(self.diff_text.clone())
    }

    fn commit(&self, message: &str) -> Result<String> {
        self.state.borrow_mut().commits.push(message.to_string());
        if self.fail_commit {
            bail!("git commit failed (exit status: 1): pre-commit hook rejected");
        }
        Ok(self.commit_output.clone())
    }

    fn push(&self) -> Result<String> {
        self.state.borrow_mut().pushes += 1;
        if self.fail_push {
            bail!("git push failed (exit status: 128): no upstream");
        }
        Ok(self.push_output.clone())
    }
}

/// expect one yes/no `question` next in `seq`, answered with `answer` (`None` cancels)
pub fn expect_confirm(
    prompter: &mut MockPrompter,
    seq: &mut Sequence,
    question: &'static str,
    answer: Option<bool>,
) {
    prompter
        .expect_confirm()
        .withf(move |asked, _| asked == question)
        .times(1)
        .in_sequence(seq)
        .returning(move |_, _| Ok(answer));
}

pub fn expect_text(
    prompter: &mut MockPrompter,
    seq: &mut Sequence,
    question: &'static str,
    answer: Option<&'static str>,
) {
    prompter
        .expect_text()
        .withf(move |asked| asked == question)
        .times(1)
        .in_sequence(seq)
        .returning(move |_| Ok(answer.map(ToString::to_string)));
}

/// expect the file picker to offer `offered` and come back with `picked`
pub fn expect_select(
    prompter: &mut MockPrompter,
    seq: &mut Sequence,
    offered: &[&str],
    picked: Option<&[&str]>,
) {
    let offered: Vec<String> = offered.iter().map(ToString::to_string).collect();
    let picked: Option<Vec<String>> =
        picked.map(|files| files.iter().map(ToString::to_string).collect());
    prompter
        .expect_multi_select()
        .withf(move |asked, options| {
            asked == "select files to stage" && options == offered.as_slice()
        })
        .times(1)
        .in_sequence(seq)
        .returning(move |_, _| Ok(picked.clone()));
}

/// a backend expecting one request for `diff` with `notes`, answering `text`
pub fn backend_replying(
    diff: &'static str,
    notes: &'static str,
    text: &'static str,
) -> MockBackend {
    let mut backend = MockBackend::new();
    backend
        .expect_complete()
        .withf(move |sent_diff, sent_notes| sent_diff == diff && sent_notes == notes)
        .times(1)
        .returning(move |_, _| Ok(text.to_string()));
    backend
}
