use crate::context::AppContext;
use crate::outcome::Abort;
use crate::status;
use anyhow::Result;

/// the staged files a commit will be generated for, or why there are none
#[derive(Debug, PartialEq, Eq)]
pub enum Resolution {
    Ready(Vec<String>),
    Stop(Abort),
}

/// staging rounds; every path ends in `Settled` so there is no way back to `Detect`
#[derive(Debug)]
enum Round {
    Detect,
    StageAll,
    Select(Vec<String>),
    Settled,
}

/// work out what to commit, staging files when nothing is staged yet
pub fn resolve(ctx: &mut AppContext, stage_all: bool) -> Result<Resolution> {
    let mut round = if stage_all {
        Round::StageAll
    } else {
        Round::Detect
    };

    loop {
        round = match round {
            Round::Detect => {
                let staged = ctx.git.staged_files()?;
                if !staged.is_empty() {
                    return Ok(Resolution::Ready(staged));
                }

                let changed = ctx.git.changed_files()?;
                if changed.is_empty() {
                    return Ok(Resolution::Stop(Abort::NoChanges));
                }

                let question = format!(
                    "no files staged, stage all {} changed {}?",
                    changed.len(),
                    file_word(changed.len())
                );
                match ctx.prompter.confirm(&question, true)? {
                    Some(true) => Round::StageAll,
                    Some(false) => Round::Select(changed),
                    None => return Ok(Resolution::Stop(Abort::Cancelled)),
                }
            }
            Round::StageAll => {
                let changed = ctx.git.changed_files()?;
                if changed.is_empty() {
                    return Ok(Resolution::Stop(Abort::NoChanges));
                }
                status!(
                    "staging {} {}...",
                    changed.len(),
                    file_word(changed.len())
                );
                ctx.git.stage_files(&changed)?;
                Round::Settled
            }
            Round::Select(changed) => {
                let picked = ctx
                    .prompter
                    .multi_select("select files to stage", &changed)?;
                match picked {
                    Some(files) if !files.is_empty() => {
                        ctx.git.stage_files(&files)?;
                        Round::Settled
                    }
                    _ => return Ok(Resolution::Stop(Abort::NothingSelected)),
                }
            }
            Round::Settled => {
                let staged = ctx.git.staged_files()?;
                if staged.is_empty() {
                    return Ok(Resolution::Stop(Abort::NoChanges));
                }
                return Ok(Resolution::Ready(staged));
            }
        };
    }
}

pub fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
