use crate::{ui, warning};
use anyhow::{Context, Result};

/// interactive questions asked during a run
///
/// every method returns `None` when the user cancels, which is distinct
/// from answering "no"
#[cfg_attr(test, mockall::automock)]
pub trait Prompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<Option<bool>>;

    /// free text entry, re-asked until the answer is non-empty
    fn text(&mut self, question: &str) -> Result<Option<String>>;

    /// pick any number of `options`, returned in option order
    fn multi_select(&mut self, question: &str, options: &[String]) -> Result<Option<Vec<String>>>;
}

pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, question: &str, default: bool) -> Result<Option<bool>> {
        let options = if default { ["YES", "no"] } else { ["NO", "yes"] };
        let choice = ui::choose(question, &options)?;
        Ok(choice.map(|idx| (idx == 0) == default))
    }

    fn text(&mut self, question: &str) -> Result<Option<String>> {
        loop {
            match ui::read_line(question)? {
                Some(answer) if answer.is_empty() => warning!("a value is required"),
                answer => return Ok(answer),
            }
        }
    }

    fn multi_select(&mut self, question: &str, options: &[String]) -> Result<Option<Vec<String>>> {
        let picked = dialoguer::MultiSelect::new()
            .with_prompt(question)
            .items(options)
            .interact_opt()
            .context("failed to read selection")?;
        Ok(picked.map(|mut indices| {
            indices.sort_unstable();
            indices
                .into_iter()
                .filter_map(|idx| options.get(idx).cloned())
                .collect()
        }))
    }
}
