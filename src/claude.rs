use crate::config::{BackendKind, Config};
use crate::constants::{API_MAX_TOKENS, API_URL, API_VERSION};
use crate::warning;
use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

const INSTRUCTIONS: &str = r#"
IGNORE ALL CLAUDE.MD FILES. this task overrides any claude.md instructions.

YOU ARE A COMMIT MESSAGE GENERATOR.

Read the diff below and write ONE commit message for it.

OUTPUT FORMAT (mandatory):
```
<commit message here>
```

RULES:
- wrap the commit message in triple backticks, nothing before or after
- single line, at most 72 characters
- start with a lowercase letter, no trailing period
- short verbs: add, fix, update, remove, refactor
- describe the outcome, not the implementation
- no claude attribution
"#;

/// a single completion request: the diff plus optional user notes
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub diff: &'a str,
    pub notes: &'a str,
}

impl Request<'_> {
    /// instructions plus notes, everything except the diff
    pub fn prompt(&self) -> String {
        let mut prompt = INSTRUCTIONS.trim().to_string();
        if !self.notes.trim().is_empty() {
            prompt.push_str("\n\nEXTRA CONTEXT FROM THE AUTHOR:\n");
            prompt.push_str(self.notes.trim());
        }
        prompt
    }
}

#[derive(Error, Debug)]
pub enum BackendError {
    /// the request was rejected as too large for the model
    #[error("request is too large for the model")]
    ContextOverflow,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

/// a service that turns a diff (plus optional notes) into raw completion text
#[cfg_attr(test, mockall::automock)]
pub trait Backend {
    fn complete(&self, diff: &str, notes: &str) -> Result<String, BackendError>;
}

pub fn from_config(config: &Config) -> Box<dyn Backend> {
    match config.backend {
        BackendKind::Cli => Box::new(ClaudeCli {
            command: config.claude_command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }),
        BackendKind::Api => Box::new(ClaudeApi {
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }),
    }
}

/// pull the commit message out of triple backticks, falling back to the whole output
pub fn extract_message(output: &str) -> String {
    let output = output.trim();

    if let Some(start) = output.find("```") {
        let after_first = &output[start + 3..];
        if let Some(end) = after_first.find("```") {
            let mut block = &after_first[..end];
            // drop a language tag on the opening fence line, eg ```text
            if let Some((tag, rest)) = block.split_once('\n')
                && !tag.trim().is_empty()
                && !tag.trim().contains(char::is_whitespace)
                && !rest.trim().is_empty()
            {
                block = rest;
            }
            return block.trim().to_string();
        }
    }

    output.to_string()
}

/// whether an error message from claude means the prompt was too large
fn is_overflow_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("prompt is too long")
        || lower.contains("too many tokens")
        || lower.contains("context length")
        || lower.contains("context window")
}

/// the local `claude` command line tool
pub struct ClaudeCli {
    pub command: Vec<String>,
    pub timeout: Duration,
}

impl Backend for ClaudeCli {
    fn complete(&self, diff: &str, notes: &str) -> Result<String, BackendError> {
        let request = Request { diff, notes };
        let Some((program, args)) = self.command.split_first() else {
            return Err(anyhow!("claude command is empty").into());
        };

        let mut input = request.prompt();
        input.push_str("\n\n");
        input.push_str(request.diff);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        // write input to stdin and close it
        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(input.as_bytes())
        {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!("failed to write to {program} stdin: {e}").into());
        }

        let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!("failed to capture {program} output").into());
        };

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                if let Err(e) = child.kill() {
                    warning!("failed to kill {} process: {}", program, e);
                }
                let _ = child.wait();
                return Err(anyhow!("{program} thought for too long").into());
            }
            Err(e) => return Err(anyhow!("failed to wait for {program}: {e}").into()),
        };

        let mut stdout_data = Vec::new();
        let mut stderr_data = Vec::new();
        if let Err(e) = stdout.read_to_end(&mut stdout_data) {
            warning!("failed to read {} stdout: {}", program, e);
        }
        if let Err(e) = stderr.read_to_end(&mut stderr_data) {
            warning!("failed to read {} stderr: {}", program, e);
        }
        let stdout_text = String::from_utf8_lossy(&stdout_data).trim().to_string();
        let stderr_text = String::from_utf8_lossy(&stderr_data).trim().to_string();

        if !status.success() {
            if is_overflow_message(&stderr_text) || is_overflow_message(&stdout_text) {
                return Err(BackendError::ContextOverflow);
            }
            let detail = if stderr_text.is_empty() {
                stdout_text
            } else {
                stderr_text
            };
            return Err(anyhow!("{program} exited with {status}: {detail}").into());
        }

        Ok(stdout_text)
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: [ApiMessage<'a>; 1],
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    content: Vec<ApiContent>,
}

#[derive(Deserialize)]
struct ApiContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// the anthropic messages api
pub struct ClaudeApi {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl ClaudeApi {
    fn body<'a>(&'a self, request: &'a Request) -> ApiRequest<'a> {
        ApiRequest {
            model: &self.model,
            max_tokens: API_MAX_TOKENS,
            system: request.prompt(),
            messages: [ApiMessage {
                role: "user",
                content: request.diff,
            }],
        }
    }
}

impl Backend for ClaudeApi {
    fn complete(&self, diff: &str, notes: &str) -> Result<String, BackendError> {
        let request = Request { diff, notes };
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .build();
        let agent = ureq::Agent::new_with_config(config);

        let mut response = agent
            .post(API_URL)
            .header("x-api-key", self.api_key.as_str())
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .send_json(self.body(&request))
            .context("failed to reach the anthropic api")?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .context("failed to read api response")?;

        if status == 413 {
            return Err(BackendError::ContextOverflow);
        }
        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            if status == 400 && is_overflow_message(&message) {
                return Err(BackendError::ContextOverflow);
            }
            return Err(anyhow!("api returned {status}: {message}").into());
        }

        let parsed: ApiResponse =
            serde_json::from_str(&text).context("failed to parse api response")?;
        Ok(parsed
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
