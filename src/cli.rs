use clap::Parser;

/// git-ai-commit: generate a commit message for your changes, commit, and optionally push
#[derive(Parser, Debug)]
#[command(
    name = "git-ai-commit",
    about,
    long_about = None,
    disable_version_flag = true
)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// stage every changed file before generating
    #[arg(short, long)]
    pub all: bool,

    /// extra context for the generated message (skips the notes prompt)
    #[arg(short, long, value_name = "TEXT")]
    pub notes: Option<String>,

    /// force CLI usage
    #[arg(long, conflicts_with = "api")]
    pub cli: bool,

    /// force API usage
    #[arg(long, conflicts_with = "cli")]
    pub api: bool,

    /// print the prompt sent to claude
    #[arg(long)]
    pub debug_prompt: bool,

    /// print the full response from claude
    #[arg(long)]
    pub debug_response: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
