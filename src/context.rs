use crate::claude::Backend;
use crate::gateway::DebugOutput;
use crate::git::Vcs;
use crate::prompt::Prompter;

/// application context holding the collaborators and settings for one run
pub struct AppContext<'a> {
    /// repository being committed to
    pub git: &'a dyn Vcs,

    /// where interactive questions go
    pub prompter: &'a mut dyn Prompter,

    /// completion service producing the commit message
    pub backend: &'a dyn Backend,

    /// notes given up front; `None` means ask
    pub notes: Option<String>,

    pub debug: DebugOutput,
}

impl<'a> AppContext<'a> {
    pub fn new(git: &'a dyn Vcs, prompter: &'a mut dyn Prompter, backend: &'a dyn Backend) -> Self {
        Self {
            git,
            prompter,
            backend,
            notes: None,
            debug: DebugOutput::default(),
        }
    }
}
