// ui
pub const MAX_FILES_TO_SHOW: usize = 10;

// diff
pub const DEFAULT_CONTEXT: u32 = 3;
pub const DIFF_SIZE_WARNING_BYTES: usize = 50 * 1024;
pub const DIFF_SIZE_MAXIMUM_BYTES: usize = 100 * 1024;

// claude
pub const CLAUDE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CLAUDE_COMMAND: &str = r#"claude --print --tools """#;
pub const DEFAULT_MODEL: &str = "claude-haiku-4-5";
pub const API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const API_VERSION: &str = "2023-06-01";
pub const API_MAX_TOKENS: u32 = 256;
