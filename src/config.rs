use crate::cli::Cli;
use crate::constants::{CLAUDE_TIMEOUT_SECS, DEFAULT_CLAUDE_COMMAND, DEFAULT_MODEL};
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// which completion service to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Cli,
    Api,
}

/// contents of `config.json`, every key optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub backend: Option<BackendKind>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub claude_command: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// resolved settings for the completion backend
#[derive(Debug)]
pub struct Config {
    pub backend: BackendKind,
    pub model: String,
    pub api_key: Option<String>,
    pub claude_command: Vec<String>,
    pub timeout_secs: u64,
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("git-ai-commit").join("config.json"))
}

/// read the config file, a missing file yields defaults
pub fn read_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid config in {}", path.display()))
}

pub fn load(cli: &Cli) -> Result<Config> {
    let file = match config_path() {
        Some(path) => read_file(&path)?,
        None => FileConfig::default(),
    };
    let env_key = std::env::var("ANTHROPIC_API_KEY").ok();
    resolve(cli, file, env_key)
}

/// merge command line flags, environment and config file
pub fn resolve(cli: &Cli, file: FileConfig, env_key: Option<String>) -> Result<Config> {
    let api_key = env_key
        .filter(|key| !key.trim().is_empty())
        .or(file.api_key)
        .filter(|key| !key.trim().is_empty());

    let backend = if cli.cli {
        BackendKind::Cli
    } else if cli.api {
        BackendKind::Api
    } else if let Some(kind) = file.backend {
        kind
    } else if api_key.is_some() {
        BackendKind::Api
    } else {
        BackendKind::Cli
    };

    if backend == BackendKind::Api && api_key.is_none() {
        bail!("API usage requires ANTHROPIC_API_KEY or api_key in the config file");
    }

    let command = file
        .claude_command
        .unwrap_or_else(|| DEFAULT_CLAUDE_COMMAND.to_string());
    let claude_command = match shlex::split(&command) {
        Some(parts) if !parts.is_empty() => parts,
        _ => bail!("invalid claude_command: {command}"),
    };

    Ok(Config {
        backend,
        model: file.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        api_key,
        claude_command,
        timeout_secs: file.timeout_secs.unwrap_or(CLAUDE_TIMEOUT_SECS),
    })
}
