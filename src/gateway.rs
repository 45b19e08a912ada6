use crate::claude::{self, Backend, BackendError, Request};
use crate::constants::{DIFF_SIZE_MAXIMUM_BYTES, DIFF_SIZE_WARNING_BYTES};
use crate::{info, ui, warning};
use num_format::{Locale, ToFormattedString};
use thiserror::Error;

/// why a commit message could not be generated
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationError {
    #[error("empty AI response, try again")]
    EmptyMessage,

    #[error("internal error, try again")]
    InternalError,

    #[error("too much content in diff; stage and commit in smaller parts")]
    TooMuchTokens,
}

/// debugging output requested on the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugOutput {
    pub show_prompt: bool,
    pub show_response: bool,
}

/// ask the backend for a commit message, exactly one attempt
pub fn generate(
    backend: &dyn Backend,
    diff: &str,
    notes: &str,
    debug: DebugOutput,
) -> Result<String, GenerationError> {
    let diff_size = diff.len();
    if diff_size > DIFF_SIZE_MAXIMUM_BYTES {
        warning!(
            "diff is too large ({} chars, max {})",
            diff_size.to_formatted_string(&Locale::en),
            DIFF_SIZE_MAXIMUM_BYTES.to_formatted_string(&Locale::en)
        );
        return Err(GenerationError::TooMuchTokens);
    } else if diff_size > DIFF_SIZE_WARNING_BYTES {
        warning!(
            "diff is large ({} chars), this may use many tokens",
            diff_size.to_formatted_string(&Locale::en)
        );
    }

    let request = Request { diff, notes };
    if debug.show_prompt {
        use colored::Colorize;
        info!("\n{}", request.prompt().dimmed());
    }

    let spinner = ui::spinner("generating commit message...");
    let result = backend.complete(diff, notes);
    spinner.finish_and_clear();

    let output = match result {
        Ok(output) => output,
        Err(BackendError::ContextOverflow) => return Err(GenerationError::TooMuchTokens),
        Err(BackendError::Failed(e)) => {
            warning!("{:#}", e);
            return Err(GenerationError::InternalError);
        }
    };

    if debug.show_response {
        use colored::Colorize;
        info!("\n{}", output.dimmed());
    }

    let message = claude::extract_message(&output);
    if message.is_empty() {
        return Err(GenerationError::EmptyMessage);
    }
    Ok(message)
}
