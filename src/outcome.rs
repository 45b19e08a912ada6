use crate::gateway::GenerationError;
use thiserror::Error;

/// how a run ended, reported once by `main`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Committed { pushed: bool },
    Aborted(Abort),
}

/// graceful reasons to stop without committing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Abort {
    #[error("no changes detected")]
    NoChanges,

    #[error("no files selected")]
    NothingSelected,

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Committed { .. } => 0,
            Self::Aborted(_) => 1,
        }
    }
}
