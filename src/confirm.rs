use crate::changeset::ChangeSet;
use crate::constants::MAX_FILES_TO_SHOW;
use crate::context::AppContext;
use crate::gateway;
use crate::outcome::{Abort, Outcome};
use crate::{info, status};
use anyhow::Result;

/// generate the message, then walk through commit and push confirmation
pub fn run(ctx: &mut AppContext, changeset: &ChangeSet, notes: &str) -> Result<Outcome> {
    let message = match gateway::generate(ctx.backend, &changeset.diff, notes, ctx.debug) {
        Ok(message) => message,
        Err(e) => return Ok(Outcome::Aborted(e.into())),
    };

    display_commit_info(&message, &changeset.files);

    // declining and cancelling both leave the index untouched
    if ctx.prompter.confirm("commit with this message?", true)? != Some(true) {
        return Ok(Outcome::Aborted(Abort::Cancelled));
    }

    report_output(&ctx.git.commit(&message)?);

    // a finished commit is a success whether or not we push
    if ctx.prompter.confirm("push to remote?", false)? != Some(true) {
        return Ok(Outcome::Committed { pushed: false });
    }

    status!("pushing...");
    report_output(&ctx.git.push()?);
    Ok(Outcome::Committed { pushed: true })
}

/// show what git printed, if anything
fn report_output(output: &str) -> Option<&str> {
    let output = output.trim();
    if output.is_empty() {
        return None;
    }
    info!(output);
    Some(output)
}

/// display commit message and the files it covers
fn display_commit_info(message: &str, files: &[String]) {
    info!();
    info!(message);
    info!();

    status!("files:");
    for file in files.iter().take(MAX_FILES_TO_SHOW) {
        info!("  {}", file);
    }
    if files.len() > MAX_FILES_TO_SHOW {
        info!("  (+{} more)", files.len() - MAX_FILES_TO_SHOW);
    }
    info!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claude::MockBackend;
    use crate::gateway::GenerationError;
    use crate::prompt::MockPrompter;
    use crate::testing::{FakeGit, backend_replying, expect_confirm};
    use anyhow::anyhow;
    use mockall::Sequence;

    fn changeset() -> ChangeSet {
        ChangeSet {
            files: vec!["a.ts".into()],
            diff: "+line".into(),
        }
    }

    fn run_with(
        git: &FakeGit,
        prompter: &mut MockPrompter,
        backend: &MockBackend,
    ) -> Result<Outcome> {
        let mut ctx = AppContext::new(git, prompter, backend);
        run(&mut ctx, &changeset(), "")
    }

    /// commit confirmation then push confirmation, in that order
    fn answering(commit: Option<bool>, push: Option<bool>) -> MockPrompter {
        let mut prompter = MockPrompter::new();
        let mut seq = Sequence::new();
        expect_confirm(&mut prompter, &mut seq, "commit with this message?", commit);
        if commit == Some(true) {
            expect_confirm(&mut prompter, &mut seq, "push to remote?", push);
        }
        prompter
    }

    #[test]
    fn commits_exact_message_and_skips_push() {
        let git = FakeGit::new(&["a.ts"], &["a.ts"]);
        let backend = backend_replying("+line", "", "```\nfix: add line\n```");
        let mut prompter = answering(Some(true), Some(false));

        let outcome = run_with(&git, &mut prompter, &backend).unwrap();

        assert_eq!(outcome, Outcome::Committed { pushed: false });
        assert_eq!(git.commits(), ["fix: add line"]);
        assert_eq!(git.pushes(), 0);
    }

    #[test]
    fn confirmed_push_runs_once() {
        let git = FakeGit::new(&["a.ts"], &["a.ts"]);
        let backend = backend_replying("+line", "", "add login");
        let mut prompter = answering(Some(true), Some(true));

        let outcome = run_with(&git, &mut prompter, &backend).unwrap();

        assert_eq!(outcome, Outcome::Committed { pushed: true });
        assert_eq!(git.pushes(), 1);
    }

    #[test]
    fn cancelled_push_still_succeeds() {
        let git = FakeGit::new(&["a.ts"], &["a.ts"]);
        let backend = backend_replying("+line", "", "add login");
        let mut prompter = answering(Some(true), None);

        let outcome = run_with(&git, &mut prompter, &backend).unwrap();

        assert_eq!(outcome, Outcome::Committed { pushed: false });
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(git.pushes(), 0);
    }

    #[test]
    fn declined_commit_never_commits() {
        for answer in [Some(false), None] {
            let git = FakeGit::new(&["a.ts"], &["a.ts"]);
            let backend = backend_replying("+line", "", "add login");
            let mut prompter = answering(answer, None);

            let outcome = run_with(&git, &mut prompter, &backend).unwrap();

            assert_eq!(outcome, Outcome::Aborted(Abort::Cancelled));
            assert!(git.commits().is_empty());
            assert_eq!(git.pushes(), 0);
        }
    }

    #[test]
    fn generation_error_asks_nothing() {
        let git = FakeGit::new(&["a.ts"], &["a.ts"]);
        let mut backend = MockBackend::new();
        backend
            .expect_complete()
            .times(1)
            .returning(|_, _| Err(anyhow!("service unavailable").into()));
        let mut prompter = MockPrompter::new();

        let outcome = run_with(&git, &mut prompter, &backend).unwrap();

        assert_eq!(
            outcome,
            Outcome::Aborted(Abort::Generation(GenerationError::InternalError))
        );
        assert!(git.commits().is_empty());
    }

    #[test]
    fn commit_failure_is_fatal_and_skips_push() {
        let mut git = FakeGit::new(&["a.ts"], &["a.ts"]);
        git.fail_commit = true;
        let backend = backend_replying("+line", "", "add login");
        let mut prompter = MockPrompter::new();
        let mut seq = Sequence::new();
        expect_confirm(&mut prompter, &mut seq, "commit with this message?", Some(true));

        let err = run_with(&git, &mut prompter, &backend).unwrap_err();

        assert!(err.to_string().contains("pre-commit hook rejected"));
        assert_eq!(git.pushes(), 0);
    }

    #[test]
    fn push_failure_is_fatal() {
        let mut git = FakeGit::new(&["a.ts"], &["a.ts"]);
        git.fail_push = true;
        let backend = backend_replying("+line", "", "add login");
        let mut prompter = answering(Some(true), Some(true));

        assert!(run_with(&git, &mut prompter, &backend).is_err());
        assert_eq!(git.commits().len(), 1);
    }

    #[test]
    fn git_output_is_shown_trimmed() {
        assert_eq!(
            report_output("[main 1a2b3c4] add login\n 1 file changed\n"),
            Some("[main 1a2b3c4] add login\n 1 file changed")
        );
    }

    #[test]
    fn empty_git_output_shows_nothing() {
        assert_eq!(report_output(""), None);
        assert_eq!(report_output("  \n"), None);
    }
}
