mod changeset;
mod claude;
mod cli;
mod config;
mod confirm;
mod constants;
mod context;
mod flow;
mod gateway;
mod git;
mod outcome;
mod prompt;
mod resolver;
#[cfg(test)]
mod testing;
mod ui;

use crate::cli::Cli;
use crate::config::Config;
use crate::context::AppContext;
use crate::gateway::DebugOutput;
use crate::git::{GitRepo, Vcs};
use crate::outcome::Outcome;
use crate::prompt::TerminalPrompter;
use anyhow::{Result, bail};
use std::io::IsTerminal;

fn main() {
    match run() {
        Ok(outcome) => {
            match &outcome {
                Outcome::Committed { pushed: true } => status!("committed and pushed"),
                Outcome::Committed { pushed: false } => status!("committed"),
                Outcome::Aborted(abort) => error!("{}", abort),
            }
            std::process::exit(outcome.exit_code());
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<Outcome> {
    let args = Cli::parse_args();

    // sanity checks
    if !std::io::stdin().is_terminal()
        || !std::io::stdout().is_terminal()
        || !std::io::stderr().is_terminal()
    {
        bail!("interactive terminal required");
    }

    let git = GitRepo::new(".");
    let config = load_config(&git, &args)?;
    let backend = claude::from_config(&config);
    let mut prompter = TerminalPrompter;

    let mut ctx = AppContext::new(&git, &mut prompter, backend.as_ref());
    ctx.notes = args.notes;
    ctx.debug = DebugOutput {
        show_prompt: args.debug_prompt,
        show_response: args.debug_response,
    };

    flow::commit(&mut ctx, args.all)
}

/// the repository is checked before any configuration is read
fn load_config(git: &dyn Vcs, args: &Cli) -> Result<Config> {
    git.assert_repo()?;
    config::load(args)
}
