use crate::changeset::ChangeSet;
use crate::confirm;
use crate::context::AppContext;
use crate::outcome::{Abort, Outcome};
use crate::resolver::{self, Resolution};
use crate::status;
use anyhow::Result;

/// the whole commit workflow: resolve staging, ask for notes, generate, confirm
///
/// graceful stops come back as `Outcome::Aborted`; `Err` is reserved for
/// failures of git or the terminal
pub fn commit(ctx: &mut AppContext, stage_all: bool) -> Result<Outcome> {
    ctx.git.assert_repo()?;

    let files = match resolver::resolve(ctx, stage_all)? {
        Resolution::Ready(files) => files,
        Resolution::Stop(abort) => return Ok(Outcome::Aborted(abort)),
    };

    let notes = match ctx.notes.clone() {
        Some(notes) => notes,
        None => match ask_for_notes(ctx)? {
            Some(notes) => notes,
            None => return Ok(Outcome::Aborted(Abort::Cancelled)),
        },
    };

    let diff = ctx.git.diff(&files)?;
    let changeset = ChangeSet { files, diff };
    status!("found {}", changeset.describe());

    confirm::run(ctx, &changeset, &notes)
}

/// optional free text for the generator; empty when declined, None when cancelled
fn ask_for_notes(ctx: &mut AppContext) -> Result<Option<String>> {
    match ctx.prompter.confirm("add notes for the commit message?", false)? {
        Some(true) => ctx.prompter.text("notes:"),
        Some(false) => Ok(Some(String::new())),
        None => Ok(None),
    }
}
